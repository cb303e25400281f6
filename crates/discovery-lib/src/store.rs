//! Board state and the command reducer.
//!
//! [`BoardState`] is an immutable snapshot of the three persisted buckets.
//! Every mutation is a [`Command`] applied by [`BoardState::apply`], which
//! computes the whole next snapshot before anything is swapped in.
//! [`Store`] owns the current snapshot and tracks which buckets are dirty.

use std::ops::{BitOr, BitOrAssign};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::ideas::IdeaStore;
use crate::model::{Idea, Prefs, Project, SortMode, Status, ViewMode};
use crate::projects::ProjectStore;
use crate::query::{IdeaDraft, IdeaPatch, ProjectDraft, ProjectPatch, SortColumn, TableSort};
use crate::storage::Bucket;
use crate::util::generate_id;

/// A board mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddIdea {
        project_id: String,
        draft: IdeaDraft,
    },
    UpdateIdea {
        id: String,
        patch: IdeaPatch,
    },
    DeleteIdea {
        id: String,
    },
    ChangeStatus {
        id: String,
        status: Status,
        order: Option<i64>,
    },
    /// Replace the idea collection with a list that already carries its
    /// final `order` values.
    Reorder {
        ideas: Vec<Idea>,
    },
    AddProject {
        draft: ProjectDraft,
    },
    UpdateProject {
        id: String,
        patch: ProjectPatch,
    },
    /// Delete a project together with its ideas.
    DeleteProject {
        id: String,
    },
    SetActiveProject {
        id: Option<String>,
    },
    SetViewMode {
        mode: ViewMode,
    },
    SetSortMode {
        mode: SortMode,
    },
    SetTableSort {
        sort: TableSort,
    },
    /// Header click: flip the current column or switch to a new one.
    ToggleTableSort {
        column: SortColumn,
    },
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddIdea { .. } => "add_idea",
            Self::UpdateIdea { .. } => "update_idea",
            Self::DeleteIdea { .. } => "delete_idea",
            Self::ChangeStatus { .. } => "change_status",
            Self::Reorder { .. } => "reorder",
            Self::AddProject { .. } => "add_project",
            Self::UpdateProject { .. } => "update_project",
            Self::DeleteProject { .. } => "delete_project",
            Self::SetActiveProject { .. } => "set_active_project",
            Self::SetViewMode { .. } => "set_view_mode",
            Self::SetSortMode { .. } => "set_sort_mode",
            Self::SetTableSort { .. } => "set_table_sort",
            Self::ToggleTableSort { .. } => "toggle_table_sort",
        }
    }
}

/// Which persisted buckets a transition touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes {
    pub ideas: bool,
    pub projects: bool,
    pub prefs: bool,
}

impl Changes {
    pub const NONE: Self = Self {
        ideas: false,
        projects: false,
        prefs: false,
    };
    pub const IDEAS: Self = Self {
        ideas: true,
        projects: false,
        prefs: false,
    };
    pub const PROJECTS: Self = Self {
        ideas: false,
        projects: true,
        prefs: false,
    };
    pub const PREFS: Self = Self {
        ideas: false,
        projects: false,
        prefs: true,
    };
    pub const ALL: Self = Self {
        ideas: true,
        projects: true,
        prefs: true,
    };

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.ideas || self.projects || self.prefs)
    }

    #[must_use]
    pub const fn contains(self, bucket: Bucket) -> bool {
        match bucket {
            Bucket::Ideas => self.ideas,
            Bucket::Projects => self.projects,
            Bucket::Prefs => self.prefs,
        }
    }

    /// Changed buckets in storage order.
    pub fn buckets(self) -> impl Iterator<Item = Bucket> {
        Bucket::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

impl BitOr for Changes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            ideas: self.ideas || rhs.ideas,
            projects: self.projects || rhs.projects,
            prefs: self.prefs || rhs.prefs,
        }
    }
}

impl BitOrAssign for Changes {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    pub changes: Changes,
    /// ID of the idea or project the command created, if any.
    pub created: Option<String>,
}

impl Outcome {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    const fn changed(changes: Changes) -> Self {
        Self {
            changes,
            created: None,
        }
    }
}

/// Snapshot of everything the board persists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub ideas: IdeaStore,
    pub projects: ProjectStore,
    pub prefs: Prefs,
}

impl BoardState {
    #[must_use]
    pub fn new(ideas: IdeaStore, projects: ProjectStore, prefs: Prefs) -> Self {
        Self {
            ideas,
            projects,
            prefs,
        }
    }

    /// The selected project, if it still exists.
    #[must_use]
    pub fn active_project(&self) -> Option<&Project> {
        self.prefs
            .active_project_id
            .as_deref()
            .and_then(|id| self.projects.get(id))
    }

    /// Compute the snapshot that follows `command`.
    ///
    /// Returns `None` when the command changes nothing: unknown ids, empty
    /// patches, values already set, or a table-sort toggle in manual mode.
    #[must_use]
    pub fn apply(&self, command: Command, now: DateTime<Utc>) -> Option<(Self, Outcome)> {
        match command {
            Command::AddIdea { project_id, draft } => {
                if !self.projects.contains(&project_id) {
                    return None;
                }
                let id = generate_id("idea", &draft.title, now, self.ideas.len(), |id| {
                    self.ideas.contains(id)
                });
                let ideas = self.ideas.add(&project_id, &draft, id.clone(), now);
                Some((
                    self.with_ideas(ideas),
                    Outcome {
                        changes: Changes::IDEAS,
                        created: Some(id),
                    },
                ))
            }
            Command::UpdateIdea { id, patch } => {
                if patch.is_empty() {
                    return None;
                }
                let ideas = self.ideas.update(&id, &patch, now)?;
                Some((self.with_ideas(ideas), Outcome::changed(Changes::IDEAS)))
            }
            Command::DeleteIdea { id } => {
                let ideas = self.ideas.delete(&id)?;
                Some((self.with_ideas(ideas), Outcome::changed(Changes::IDEAS)))
            }
            Command::ChangeStatus { id, status, order } => {
                let ideas = self.ideas.change_status(&id, status, order, now)?;
                Some((self.with_ideas(ideas), Outcome::changed(Changes::IDEAS)))
            }
            Command::Reorder { ideas } => {
                if ideas.as_slice() == self.ideas.as_slice() {
                    return None;
                }
                Some((
                    self.with_ideas(IdeaStore::reorder(ideas)),
                    Outcome::changed(Changes::IDEAS),
                ))
            }
            Command::AddProject { draft } => {
                let id = generate_id("proj", &draft.name, now, self.projects.len(), |id| {
                    self.projects.contains(id)
                });
                let projects = self.projects.add(&draft, id.clone(), now);
                Some((
                    Self {
                        projects,
                        ..self.clone()
                    },
                    Outcome {
                        changes: Changes::PROJECTS,
                        created: Some(id),
                    },
                ))
            }
            Command::UpdateProject { id, patch } => {
                if patch.is_empty() {
                    return None;
                }
                let projects = self.projects.update(&id, &patch)?;
                Some((
                    Self {
                        projects,
                        ..self.clone()
                    },
                    Outcome::changed(Changes::PROJECTS),
                ))
            }
            Command::DeleteProject { id } => self.delete_project(&id),
            Command::SetActiveProject { id } => {
                if id == self.prefs.active_project_id {
                    return None;
                }
                if let Some(ref target) = id {
                    if !self.projects.contains(target) {
                        return None;
                    }
                }
                self.with_prefs(Prefs {
                    active_project_id: id,
                    ..self.prefs.clone()
                })
            }
            Command::SetViewMode { mode } => self.with_prefs(Prefs {
                view_mode: mode,
                ..self.prefs.clone()
            }),
            Command::SetSortMode { mode } => self.with_prefs(Prefs {
                sort_mode: mode,
                ..self.prefs.clone()
            }),
            Command::SetTableSort { sort } => self.with_prefs(Prefs {
                table_sort: sort,
                ..self.prefs.clone()
            }),
            Command::ToggleTableSort { column } => {
                if self.prefs.sort_mode.is_manual() {
                    return None;
                }
                self.with_prefs(Prefs {
                    table_sort: self.prefs.table_sort.toggled(column),
                    ..self.prefs.clone()
                })
            }
        }
    }

    fn delete_project(&self, id: &str) -> Option<(Self, Outcome)> {
        let projects = self.projects.delete(id)?;
        let mut changes = Changes::PROJECTS;

        let ideas = match self.ideas.delete_project_ideas(id) {
            Some(pruned) => {
                changes |= Changes::IDEAS;
                pruned
            }
            None => self.ideas.clone(),
        };

        let mut prefs = self.prefs.clone();
        if prefs.active_project_id.as_deref() == Some(id) {
            prefs.active_project_id = None;
            changes |= Changes::PREFS;
        }

        Some((
            Self {
                ideas,
                projects,
                prefs,
            },
            Outcome::changed(changes),
        ))
    }

    fn with_ideas(&self, ideas: IdeaStore) -> Self {
        Self {
            ideas,
            projects: self.projects.clone(),
            prefs: self.prefs.clone(),
        }
    }

    fn with_prefs(&self, prefs: Prefs) -> Option<(Self, Outcome)> {
        if prefs == self.prefs {
            return None;
        }
        Some((
            Self {
                prefs,
                ..self.clone()
            },
            Outcome::changed(Changes::PREFS),
        ))
    }
}

/// Owner of the current board snapshot.
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: BoardState,
    dirty: Changes,
}

impl Store {
    #[must_use]
    pub fn new(state: BoardState) -> Self {
        Self {
            state,
            dirty: Changes::NONE,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &BoardState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> BoardState {
        self.state
    }

    /// Apply a command stamped with the current time.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        self.dispatch_at(command, Utc::now())
    }

    /// Apply a command with an explicit timestamp.
    pub fn dispatch_at(&mut self, command: Command, now: DateTime<Utc>) -> Outcome {
        let name = command.name();
        match self.state.apply(command, now) {
            Some((next, outcome)) => {
                debug!(
                    command = name,
                    ideas = outcome.changes.ideas,
                    projects = outcome.changes.projects,
                    prefs = outcome.changes.prefs,
                    "Applied command"
                );
                self.state = next;
                self.dirty |= outcome.changes;
                outcome
            }
            None => {
                trace!(command = name, "Command changed nothing");
                Outcome::default()
            }
        }
    }

    /// Mark buckets as needing a write, e.g. after a load-time repair.
    pub fn mark_dirty(&mut self, changes: Changes) {
        self.dirty |= changes;
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    #[must_use]
    pub const fn dirty(&self) -> Changes {
        self.dirty
    }

    /// Return and clear the dirty set.
    pub fn take_dirty(&mut self) -> Changes {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;

    fn seeded() -> (Store, String, String) {
        let mut store = Store::default();
        let alpha = store
            .dispatch(Command::AddProject {
                draft: ProjectDraft {
                    name: "Alpha".into(),
                    description: String::new(),
                },
            })
            .created
            .unwrap();
        let beta = store
            .dispatch(Command::AddProject {
                draft: ProjectDraft {
                    name: "Beta".into(),
                    description: String::new(),
                },
            })
            .created
            .unwrap();
        for (project, title) in [(&alpha, "A1"), (&alpha, "A2"), (&beta, "B1")] {
            store.dispatch(Command::AddIdea {
                project_id: project.clone(),
                draft: IdeaDraft {
                    title: title.into(),
                    ..Default::default()
                },
            });
        }
        store.take_dirty();
        (store, alpha, beta)
    }

    #[test]
    fn test_add_idea_to_unknown_project_is_noop() {
        let (mut store, _, _) = seeded();
        let before = store.state().clone();
        let outcome = store.dispatch(Command::AddIdea {
            project_id: "proj-missing".into(),
            draft: IdeaDraft {
                title: "Lost".into(),
                ..Default::default()
            },
        });
        assert!(outcome.is_noop());
        assert_eq!(store.state(), &before);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_add_idea_reports_created_id() {
        let (mut store, alpha, _) = seeded();
        let outcome = store.dispatch(Command::AddIdea {
            project_id: alpha.clone(),
            draft: IdeaDraft {
                title: "A3".into(),
                ..Default::default()
            },
        });
        let id = outcome.created.unwrap();
        assert!(id.starts_with("idea-"));
        assert_eq!(store.state().ideas.get(&id).unwrap().project_id, alpha);
        assert_eq!(store.dirty(), Changes::IDEAS);
    }

    #[test]
    fn test_delete_project_cascades_and_clears_selection() {
        let (mut store, alpha, beta) = seeded();
        store.dispatch(Command::SetActiveProject {
            id: Some(alpha.clone()),
        });
        store.take_dirty();

        let outcome = store.dispatch(Command::DeleteProject { id: alpha.clone() });
        assert_eq!(outcome.changes, Changes::ALL);

        let state = store.state();
        assert!(state.ideas.iter().all(|i| i.project_id != alpha));
        assert_eq!(state.ideas.in_project(&beta).count(), 1);
        assert!(state.prefs.active_project_id.is_none());
    }

    #[test]
    fn test_delete_project_keeps_other_selection() {
        let (mut store, alpha, beta) = seeded();
        store.dispatch(Command::SetActiveProject {
            id: Some(beta.clone()),
        });
        let outcome = store.dispatch(Command::DeleteProject { id: alpha });
        assert!(!outcome.changes.prefs);
        assert_eq!(store.state().prefs.active_project_id, Some(beta));
    }

    #[test]
    fn test_set_active_project_requires_existing_project() {
        let (mut store, _, _) = seeded();
        let outcome = store.dispatch(Command::SetActiveProject {
            id: Some("proj-nope".into()),
        });
        assert!(outcome.is_noop());
        assert!(store.state().active_project().is_none());
    }

    #[test]
    fn test_setting_same_pref_is_noop() {
        let (mut store, _, _) = seeded();
        assert!(
            store
                .dispatch(Command::SetViewMode {
                    mode: ViewMode::Table
                })
                .is_noop()
        );
        assert!(
            !store
                .dispatch(Command::SetViewMode {
                    mode: ViewMode::Kanban
                })
                .is_noop()
        );
        assert_eq!(store.take_dirty(), Changes::PREFS);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_toggle_table_sort_ignored_in_manual_mode() {
        let (mut store, _, _) = seeded();
        store.dispatch(Command::SetSortMode {
            mode: SortMode::Manual,
        });
        let outcome = store.dispatch(Command::ToggleTableSort {
            column: SortColumn::Title,
        });
        assert!(outcome.is_noop());

        store.dispatch(Command::SetSortMode {
            mode: SortMode::Auto,
        });
        store.dispatch(Command::ToggleTableSort {
            column: SortColumn::Title,
        });
        assert_eq!(
            store.state().prefs.table_sort,
            TableSort::new(SortColumn::Title, SortDirection::Asc)
        );
    }

    #[test]
    fn test_missing_ids_are_silent_noops() {
        let (mut store, _, _) = seeded();
        let before = store.state().clone();
        let commands = vec![
            Command::UpdateIdea {
                id: "idea-zz".into(),
                patch: IdeaPatch {
                    title: Some("x".into()),
                    ..Default::default()
                },
            },
            Command::DeleteIdea {
                id: "idea-zz".into(),
            },
            Command::ChangeStatus {
                id: "idea-zz".into(),
                status: Status::Done,
                order: None,
            },
            Command::UpdateProject {
                id: "proj-zz".into(),
                patch: ProjectPatch {
                    name: Some("x".into()),
                    ..Default::default()
                },
            },
            Command::DeleteProject {
                id: "proj-zz".into(),
            },
        ];
        for command in commands {
            assert!(store.dispatch(command).is_noop());
        }
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_changes_buckets() {
        let changes = Changes::IDEAS | Changes::PREFS;
        let buckets: Vec<Bucket> = changes.buckets().collect();
        assert_eq!(buckets, vec![Bucket::Ideas, Bucket::Prefs]);
        assert_eq!(Changes::NONE.buckets().count(), 0);
    }
}
