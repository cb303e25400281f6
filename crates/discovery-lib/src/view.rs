//! Read-only projections of the board.
//!
//! Projections borrow from a [`BoardState`] and are recomputed on every
//! read. All sorts are stable, so ties keep insertion order.

use std::cmp::Ordering;

use crate::model::{Idea, Project, SortMode, Status};
use crate::query::{SortColumn, SortDirection, TableSort};
use crate::store::BoardState;

/// Ideas grouped into the six status columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KanbanBoard<'a> {
    columns: [Vec<&'a Idea>; 6],
}

impl<'a> KanbanBoard<'a> {
    #[must_use]
    pub fn column(&self, status: Status) -> &[&'a Idea] {
        &self.columns[status.column()]
    }

    /// Columns in status order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Status, &[&'a Idea])> {
        Status::ALL
            .into_iter()
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Total number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Position of a card within its column.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<(Status, usize)> {
        self.iter().find_map(|(status, ideas)| {
            ideas
                .iter()
                .position(|i| i.id == id)
                .map(|idx| (status, idx))
        })
    }
}

/// Table rows for the active project; empty when none is selected.
#[must_use]
pub fn table_view(state: &BoardState) -> Vec<&Idea> {
    state
        .active_project()
        .map_or_else(Vec::new, |p| table_for_project(state, &p.id))
}

/// Kanban columns for the active project; empty when none is selected.
#[must_use]
pub fn kanban_view(state: &BoardState) -> KanbanBoard<'_> {
    state
        .active_project()
        .map_or_else(KanbanBoard::default, |p| kanban_for_project(state, &p.id))
}

/// Table rows for a project, ordered by the current sort preferences.
///
/// Manual mode orders by `order` ascending; auto mode by the selected table
/// column and direction.
#[must_use]
pub fn table_for_project<'a>(state: &'a BoardState, project_id: &str) -> Vec<&'a Idea> {
    let mut rows: Vec<&Idea> = state
        .ideas
        .iter()
        .filter(|i| i.project_id == project_id)
        .collect();
    match state.prefs.sort_mode {
        SortMode::Manual => rows.sort_by_key(|i| i.order),
        SortMode::Auto => sort_by_table(&mut rows, state.prefs.table_sort),
    }
    rows
}

/// Kanban columns for a project.
///
/// Auto mode orders each column by score descending; manual mode by
/// `order` ascending.
#[must_use]
pub fn kanban_for_project<'a>(state: &'a BoardState, project_id: &str) -> KanbanBoard<'a> {
    let mut board = KanbanBoard::default();
    for idea in state.ideas.iter().filter(|i| i.project_id == project_id) {
        board.columns[idea.status.column()].push(idea);
    }
    for column in &mut board.columns {
        match state.prefs.sort_mode {
            SortMode::Auto => column.sort_by(|a, b| b.rice_score.total_cmp(&a.rice_score)),
            SortMode::Manual => column.sort_by_key(|i| i.order),
        }
    }
    board
}

/// Number of ideas per project, in project order.
#[must_use]
pub fn idea_counts(state: &BoardState) -> Vec<(&Project, usize)> {
    state
        .projects
        .iter()
        .map(|p| (p, state.ideas.in_project(&p.id).count()))
        .collect()
}

/// Stable sort by a table column.
pub fn sort_by_table(rows: &mut [&Idea], sort: TableSort) {
    rows.sort_by(|a, b| {
        let ord = compare_column(a, b, sort.column);
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare_column(a: &Idea, b: &Idea, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Title => compare_text(&a.title, &b.title),
        SortColumn::Status => compare_text(a.status.as_str(), b.status.as_str()),
        SortColumn::Reach => a.reach.total_cmp(&b.reach),
        SortColumn::Impact => a.impact.multiplier().total_cmp(&b.impact.multiplier()),
        SortColumn::Confidence => a.confidence.total_cmp(&b.confidence),
        SortColumn::Effort => a.effort.total_cmp(&b.effort),
        SortColumn::RiceScore => a.rice_score.total_cmp(&b.rice_score),
    }
}

// Case-insensitive without allocating; runs on every hover frame.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
