//! Drag-and-drop protocol for the kanban board and the manual table.
//!
//! A drag is `begin`, any number of `hover`s, then `drop` or `cancel`.
//! The controller never mutates the board itself: each event reads the
//! current [`BoardState`] and returns the [`Command`] to commit, if any.
//!
//! On the kanban surface, hovering over another column moves the card there
//! at once with [`SENTINEL_LAST`] as its order. Dropping onto a card of the
//! same column reorders that column and renumbers it `0..n-1`. The table
//! surface only supports drops, and only in manual sort mode.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::DiscoveryError;
use crate::ideas::IdeaStore;
use crate::model::{Idea, Status};
use crate::store::{BoardState, Command};
use crate::view::{kanban_for_project, table_for_project};

/// Order given to a card moved into a column before its final position is
/// known. Several cards hovered into one column tie until the next drop.
pub const SENTINEL_LAST: i64 = 9999;

/// Where a drag started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    #[default]
    Kanban,
    Table,
}

impl Surface {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kanban => "kanban",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Surface {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kanban" | "board" => Ok(Self::Kanban),
            "table" => Ok(Self::Table),
            other => Err(DiscoveryError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// What the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The empty area of a kanban column.
    Column(Status),
    /// Another card, by idea ID.
    Card(String),
}

impl FromStr for DropTarget {
    type Err = DiscoveryError;

    /// `column:<status>` (or `column-<status>`) names a column, anything
    /// else is a card ID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DiscoveryError::InvalidDropTarget {
                target: s.to_string(),
            });
        }
        let column = s
            .strip_prefix("column:")
            .or_else(|| s.strip_prefix("column-"));
        match column {
            Some(status) => status
                .parse()
                .map(Self::Column)
                .map_err(|_| DiscoveryError::InvalidDropTarget {
                    target: s.to_string(),
                }),
            None => Ok(Self::Card(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { id: String, surface: Surface },
}

/// Two-phase drag state machine.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Start dragging `id`. Returns `false` and stays idle when the idea is
    /// unknown, or on the table surface while sorting automatically.
    pub fn begin(&mut self, board: &BoardState, surface: Surface, id: &str) -> bool {
        if surface == Surface::Table && !board.prefs.sort_mode.is_manual() {
            debug!(id, "Table drag refused in auto sort mode");
            return false;
        }
        if !board.ideas.contains(id) {
            debug!(id, "Drag refused for unknown idea");
            return false;
        }
        self.state = DragState::Dragging {
            id: id.to_string(),
            surface,
        };
        true
    }

    /// Provisional move while the pointer is over `target`.
    ///
    /// Only kanban drags react: hovering over a column, or a card of the
    /// same project in a column, whose status differs from the dragged
    /// card's moves the card to the end of that column.
    #[must_use]
    pub fn hover(&self, board: &BoardState, target: &DropTarget) -> Option<Command> {
        let DragState::Dragging {
            ref id,
            surface: Surface::Kanban,
        } = self.state
        else {
            return None;
        };
        let dragged = board.ideas.get(id)?;
        let status = match target {
            DropTarget::Column(status) => *status,
            DropTarget::Card(over) => {
                let over = board.ideas.get(over)?;
                if over.project_id != dragged.project_id {
                    return None;
                }
                over.status
            }
        };
        if status == dragged.status {
            return None;
        }
        Some(Command::ChangeStatus {
            id: id.clone(),
            status,
            order: Some(SENTINEL_LAST),
        })
    }

    /// Finish the drag over `target`. Always returns to idle.
    pub fn drop(&mut self, board: &BoardState, target: &DropTarget) -> Option<Command> {
        let DragState::Dragging { id, surface } = std::mem::take(&mut self.state) else {
            return None;
        };
        let DropTarget::Card(over) = target else {
            // column drops were already handled by hover
            return None;
        };
        if *over == id {
            return None;
        }
        let dragged = board.ideas.get(&id)?;
        let target_idea = board.ideas.get(over)?;

        let sequence: Vec<&Idea> = match surface {
            Surface::Kanban => {
                if target_idea.status != dragged.status {
                    return None;
                }
                kanban_for_project(board, &dragged.project_id)
                    .column(dragged.status)
                    .to_vec()
            }
            Surface::Table => {
                if !board.prefs.sort_mode.is_manual() {
                    return None;
                }
                table_for_project(board, &dragged.project_id)
            }
        };

        let ideas = reorder_sequence(&board.ideas, &sequence, &id, over)?;
        debug!(id = %id, over = %over, %surface, "Drop reorder");
        Some(Command::Reorder { ideas })
    }

    /// Abandon the drag. A provisional hover move is not reverted.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Move the element at `from` to `to`, where `to` is an index into the list
/// after removal. Out-of-range `to` appends.
pub fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from >= list.len() {
        return;
    }
    let item = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, item);
}

// Full idea list with `sequence` reordered (dragged onto over) and
// renumbered 0..n-1.
fn reorder_sequence(
    ideas: &IdeaStore,
    sequence: &[&Idea],
    dragged: &str,
    over: &str,
) -> Option<Vec<Idea>> {
    let mut ids: Vec<&str> = sequence.iter().map(|i| i.id.as_str()).collect();
    let from = ids.iter().position(|id| *id == dragged)?;
    let to = ids.iter().position(|id| *id == over)?;
    array_move(&mut ids, from, to);
    Some(ideas.renumbered(&ids))
}
