//! The board session: store, persistence and drag state in one owned value.
//!
//! A UI constructs one [`Session`] at startup with [`Session::open`] and
//! routes every event through it. Mutations are applied synchronously and
//! written behind; the caller drives the backup timer with
//! [`Session::tick`] and calls [`Session::flush`] before shutting down.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::drag::{DragController, DragState, DropTarget, Surface};
use crate::error::Result;
use crate::model::Idea;
use crate::persist::{DEFAULT_BACKUP_DEBOUNCE, Persister};
use crate::rice::{ScoreLevel, Thresholds};
use crate::storage::{self, BackupSnapshot, BackupTransport, LoadSource, Loaded, Storage};
use crate::store::{BoardState, Command, Outcome, Store};
use crate::view::{self, KanbanBoard};

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Quiet window before the backup is pushed.
    pub backup_debounce: Duration,
    pub thresholds: Thresholds,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            backup_debounce: DEFAULT_BACKUP_DEBOUNCE,
            thresholds: Thresholds::DEFAULT,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    store: Store,
    persister: Persister,
    drag: DragController,
    source: LoadSource,
    thresholds: Thresholds,
}

impl Session {
    /// Load the board and start a session.
    ///
    /// Local storage is read with the orphan migration applied. Only when
    /// no local bucket exists is the backup consulted; a recovered backup is
    /// written to local storage straight away.
    #[must_use]
    pub fn open(
        storage: Box<dyn Storage>,
        backup: Option<Box<dyn BackupTransport>>,
        options: SessionOptions,
    ) -> Self {
        let now = Utc::now();
        let mut recovered = None;

        let loaded = match backup.as_deref() {
            Some(transport) if storage::local_is_empty(storage.as_ref()) => {
                match transport.fetch() {
                    Ok(Some(snapshot)) => {
                        info!(source = %transport.describe(), "Recovered board from backup");
                        recovered = Some(snapshot.clone());
                        storage::from_backup(snapshot, now)
                    }
                    Ok(None) => storage::load(storage.as_ref(), now),
                    Err(e) => {
                        warn!(source = %transport.describe(), error = %e, "Backup fetch failed");
                        storage::load(storage.as_ref(), now)
                    }
                }
            }
            _ => storage::load(storage.as_ref(), now),
        };

        let Loaded {
            state,
            repaired,
            source,
        } = loaded;
        debug!(
            source = source.as_str(),
            ideas = state.ideas.len(),
            projects = state.projects.len(),
            "Opened session"
        );

        let mut persister = Persister::new(storage, backup, options.backup_debounce);
        if let Some(snapshot) = recovered {
            persister.mark_pushed(&snapshot);
        }
        let mut store = Store::new(state);
        store.mark_dirty(repaired);
        let dirty = store.take_dirty();
        persister.write_buckets(store.state(), dirty);

        Self {
            store,
            persister,
            drag: DragController::new(),
            source,
            thresholds: options.thresholds,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &BoardState {
        self.store.state()
    }

    #[must_use]
    pub const fn load_source(&self) -> LoadSource {
        self.source
    }

    #[must_use]
    pub const fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Score band for display.
    #[must_use]
    pub fn level(&self, score: f64) -> ScoreLevel {
        self.thresholds.level(score)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Apply a command and persist whatever it changed.
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let outcome = self.store.dispatch_at(command, Utc::now());
        let dirty = self.store.take_dirty();
        self.persister.record(self.store.state(), dirty, Instant::now());
        outcome
    }

    fn dispatch_opt(&mut self, command: Option<Command>) -> Outcome {
        command.map_or_else(Outcome::default, |c| self.dispatch(c))
    }

    // ========================================================================
    // Views
    // ========================================================================

    #[must_use]
    pub fn table(&self) -> Vec<&Idea> {
        view::table_view(self.state())
    }

    #[must_use]
    pub fn kanban(&self) -> KanbanBoard<'_> {
        view::kanban_view(self.state())
    }

    // ========================================================================
    // Drag
    // ========================================================================

    #[must_use]
    pub const fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn drag_begin(&mut self, surface: Surface, id: &str) -> bool {
        self.drag.begin(self.store.state(), surface, id)
    }

    pub fn drag_hover(&mut self, target: &DropTarget) -> Outcome {
        let command = self.drag.hover(self.store.state(), target);
        self.dispatch_opt(command)
    }

    pub fn drag_drop(&mut self, target: &DropTarget) -> Outcome {
        let command = self.drag.drop(self.store.state(), target);
        self.dispatch_opt(command)
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    // ========================================================================
    // Backup
    // ========================================================================

    /// Push the backup if its quiet window has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.persister.tick(self.store.state(), now)
    }

    /// Push any pending backup now.
    pub fn flush(&mut self) -> bool {
        self.persister.flush(self.store.state())
    }

    #[must_use]
    pub fn has_backup(&self) -> bool {
        self.persister.backup().is_some()
    }

    #[must_use]
    pub fn backup_target(&self) -> Option<String> {
        self.persister.backup().map(BackupTransport::describe)
    }

    /// Push the current board to the backup regardless of the timer.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub fn push_backup(&mut self) -> Result<bool> {
        self.persister.push_now(self.store.state())
    }

    /// Read the stored backup without applying it.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub fn fetch_backup(&self) -> Result<Option<BackupSnapshot>> {
        match self.persister.backup() {
            Some(backup) => backup.fetch(),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SortMode, Status};
    use crate::query::{IdeaDraft, ProjectDraft};
    use crate::storage::{Bucket, FileBackup, MemoryStorage};

    fn open_memory(storage: &MemoryStorage) -> Session {
        Session::open(Box::new(storage.clone()), None, SessionOptions::default())
    }

    fn add_project(session: &mut Session, name: &str) -> String {
        let id = session
            .dispatch(Command::AddProject {
                draft: ProjectDraft {
                    name: name.into(),
                    description: String::new(),
                },
            })
            .created
            .unwrap();
        session.dispatch(Command::SetActiveProject {
            id: Some(id.clone()),
        });
        id
    }

    fn add_idea(session: &mut Session, project: &str, title: &str, status: Status) -> String {
        session
            .dispatch(Command::AddIdea {
                project_id: project.into(),
                draft: IdeaDraft {
                    title: title.into(),
                    status,
                    ..Default::default()
                },
            })
            .created
            .unwrap()
    }

    #[test]
    fn test_mutations_are_persisted_and_reloaded() {
        let storage = MemoryStorage::new();
        let mut session = open_memory(&storage);
        assert_eq!(session.load_source(), LoadSource::Empty);
        let project = add_project(&mut session, "Alpha");
        add_idea(&mut session, &project, "Dark mode", Status::Todo);

        let reopened = open_memory(&storage);
        assert_eq!(reopened.load_source(), LoadSource::Local);
        assert_eq!(reopened.state(), session.state());
        assert_eq!(reopened.table().len(), 1);
    }

    #[test]
    fn test_migration_is_written_back() {
        let storage = MemoryStorage::new();
        storage.insert(
            Bucket::Ideas,
            r#"[{"id":"old","title":"Legacy","reach":5,"impact":1,"confidence":80,"effort":4,
                "createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:00:00Z"}]"#,
        );
        let session = open_memory(&storage);
        let project_id = &session.state().ideas.get("old").unwrap().project_id;
        assert!(!project_id.is_empty());
        assert!(storage.get(Bucket::Projects).unwrap().contains("My Ideas"));
        assert!(storage.get(Bucket::Ideas).unwrap().contains(project_id.as_str()));
    }

    #[test]
    fn test_backup_recovery_only_when_local_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backup_path = dir.path().join("backup.json");

        let first = MemoryStorage::new();
        let mut session = Session::open(
            Box::new(first.clone()),
            Some(Box::new(FileBackup::new(&backup_path))),
            SessionOptions::default(),
        );
        let project = add_project(&mut session, "Alpha");
        add_idea(&mut session, &project, "Export", Status::Open);
        assert!(session.flush());

        // fresh local storage recovers from the backup
        let fresh = MemoryStorage::new();
        let recovered = Session::open(
            Box::new(fresh.clone()),
            Some(Box::new(FileBackup::new(&backup_path))),
            SessionOptions::default(),
        );
        assert_eq!(recovered.load_source(), LoadSource::Backup);
        assert_eq!(recovered.state(), session.state());
        assert!(fresh.get(Bucket::Ideas).is_some());

        // non-empty local storage ignores the backup
        let other = MemoryStorage::new();
        other.insert(Bucket::Prefs, "{}");
        let local = Session::open(
            Box::new(other),
            Some(Box::new(FileBackup::new(&backup_path))),
            SessionOptions::default(),
        );
        assert_eq!(local.load_source(), LoadSource::Local);
        assert!(local.state().ideas.is_empty());
    }

    #[test]
    fn test_tick_waits_for_quiet_window() {
        let dir = tempfile::tempdir().unwrap();
        let backup_path = dir.path().join("backup.json");
        let mut session = Session::open(
            Box::new(MemoryStorage::new()),
            Some(Box::new(FileBackup::new(&backup_path))),
            SessionOptions::default(),
        );
        add_project(&mut session, "Alpha");
        assert!(!session.tick(Instant::now()));
        assert!(!backup_path.exists());
        assert!(session.tick(Instant::now() + Duration::from_secs(2)));
        assert!(backup_path.exists());
        assert!(!session.flush());
    }

    #[test]
    fn test_drag_roundtrip_through_session() {
        let storage = MemoryStorage::new();
        let mut session = open_memory(&storage);
        let project = add_project(&mut session, "Alpha");
        session.dispatch(Command::SetSortMode {
            mode: SortMode::Manual,
        });
        let a = add_idea(&mut session, &project, "A", Status::Todo);
        let b = add_idea(&mut session, &project, "B", Status::Todo);

        assert!(session.drag_begin(Surface::Kanban, &b));
        let target = DropTarget::Card(a.clone());
        assert!(session.drag_hover(&target).is_noop());
        assert!(!session.drag_drop(&target).is_noop());

        let column: Vec<&str> = session
            .kanban()
            .column(Status::Todo)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(column, vec![b.as_str(), a.as_str()]);
        assert!(storage.get(Bucket::Ideas).is_some());
        assert_eq!(session.drag_state(), &DragState::Idle);
    }
}
