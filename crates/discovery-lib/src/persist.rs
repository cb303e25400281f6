//! Write-behind persistence.
//!
//! Changed buckets are written to [`Storage`] right after each mutation.
//! The backup is pushed on a trailing debounce: every mutation re-arms a
//! single deadline, and the snapshot is pushed once the board has been
//! quiet for the whole window. Failures are logged and swallowed; the
//! in-memory board stays authoritative.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::{self, BackupSnapshot, BackupTransport, Storage};
use crate::store::{BoardState, Changes};
use crate::util::content_hash;

/// Quiet window before a backup push.
pub const DEFAULT_BACKUP_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Trailing-edge timer with a single re-armable deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Arm, or push back, the deadline.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_DEBOUNCE)
    }
}

/// Writes buckets and schedules backups for a session.
pub struct Persister {
    storage: Box<dyn Storage>,
    backup: Option<Box<dyn BackupTransport>>,
    debounce: Debouncer,
    last_pushed: Option<String>,
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("backup", &self.backup.as_ref().map(|b| b.describe()))
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl Persister {
    #[must_use]
    pub fn new(
        storage: Box<dyn Storage>,
        backup: Option<Box<dyn BackupTransport>>,
        quiet: Duration,
    ) -> Self {
        Self {
            storage,
            backup,
            debounce: Debouncer::new(quiet),
            last_pushed: None,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    #[must_use]
    pub fn backup(&self) -> Option<&dyn BackupTransport> {
        self.backup.as_deref()
    }

    #[must_use]
    pub const fn backup_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Write changed buckets and re-arm the backup timer.
    pub fn record(&mut self, state: &BoardState, changes: Changes, now: Instant) {
        if changes.is_empty() {
            return;
        }
        self.write_buckets(state, changes);
        if self.backup.is_some() {
            self.debounce.touch(now);
        }
    }

    /// Write changed buckets without touching the backup timer.
    pub fn write_buckets(&mut self, state: &BoardState, changes: Changes) {
        for bucket in changes.buckets() {
            let result =
                storage::encode(state, bucket).and_then(|json| self.storage.write(bucket, &json));
            match result {
                Ok(()) => debug!(%bucket, "Saved bucket"),
                Err(e) => warn!(%bucket, error = %e, "Failed to save bucket"),
            }
        }
    }

    /// Remember a snapshot as already backed up.
    pub fn mark_pushed(&mut self, snapshot: &BackupSnapshot) {
        self.last_pushed = snapshot_hash(snapshot);
    }

    /// Push the backup if the quiet window has elapsed. Returns `true` when
    /// a push happened.
    pub fn tick(&mut self, state: &BoardState, now: Instant) -> bool {
        if self.debounce.fire_if_due(now) {
            self.push_quietly(state)
        } else {
            false
        }
    }

    /// Push a pending backup immediately.
    pub fn flush(&mut self, state: &BoardState) -> bool {
        if !self.debounce.is_pending() {
            return false;
        }
        self.debounce.clear();
        self.push_quietly(state)
    }

    /// Push now, skipping the debounce and the unchanged-content check.
    ///
    /// Returns `Ok(false)` when no backup is configured.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub fn push_now(&mut self, state: &BoardState) -> Result<bool> {
        let Some(backup) = self.backup.as_deref() else {
            return Ok(false);
        };
        let snapshot = BackupSnapshot::from_state(state);
        backup.push(&snapshot)?;
        self.debounce.clear();
        self.last_pushed = snapshot_hash(&snapshot);
        Ok(true)
    }

    fn push_quietly(&mut self, state: &BoardState) -> bool {
        let Some(backup) = self.backup.as_deref() else {
            return false;
        };
        let snapshot = BackupSnapshot::from_state(state);
        let hash = snapshot_hash(&snapshot);
        if hash.is_some() && hash == self.last_pushed {
            debug!("Skipping backup: unchanged since last push");
            return false;
        }
        match backup.push(&snapshot) {
            Ok(()) => {
                debug!(target = %backup.describe(), "Pushed backup");
                self.last_pushed = hash;
                true
            }
            Err(e) => {
                warn!(target = %backup.describe(), error = %e, "Backup push failed");
                false
            }
        }
    }
}

fn snapshot_hash(snapshot: &BackupSnapshot) -> Option<String> {
    serde_json::to_string(snapshot)
        .ok()
        .map(|json| content_hash(&json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use crate::model::ViewMode;
    use crate::storage::{Bucket, MemoryStorage};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingBackup {
        pushes: Rc<RefCell<Vec<BackupSnapshot>>>,
        fail: bool,
    }

    impl BackupTransport for RecordingBackup {
        fn fetch(&self) -> Result<Option<BackupSnapshot>> {
            Ok(self.pushes.borrow().last().cloned())
        }

        fn push(&self, snapshot: &BackupSnapshot) -> Result<()> {
            if self.fail {
                return Err(DiscoveryError::Backup("offline".into()));
            }
            self.pushes.borrow_mut().push(snapshot.clone());
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".into()
        }
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn read(&self, _bucket: Bucket) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&mut self, _bucket: Bucket, _contents: &str) -> Result<()> {
            Err(DiscoveryError::Storage("disk full".into()))
        }
    }

    fn kanban_state() -> BoardState {
        let mut state = BoardState::default();
        state.prefs.view_mode = ViewMode::Kanban;
        state
    }

    #[test]
    fn test_debouncer_rearms_instead_of_stacking() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(1000));
        d.touch(t0);
        d.touch(t0 + Duration::from_millis(800));
        assert!(!d.is_due(t0 + Duration::from_millis(1000)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(1800)));
        assert!(!d.is_pending());
        assert!(!d.fire_if_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_record_writes_only_changed_buckets() {
        let storage = MemoryStorage::new();
        let mut persister = Persister::new(Box::new(storage.clone()), None, DEFAULT_BACKUP_DEBOUNCE);
        persister.record(&kanban_state(), Changes::PREFS, Instant::now());

        assert!(storage.get(Bucket::Prefs).unwrap().contains("kanban"));
        assert!(storage.get(Bucket::Ideas).is_none());
        assert!(!persister.backup_pending());
    }

    #[test]
    fn test_backup_pushed_once_after_quiet_window() {
        let backup = RecordingBackup::default();
        let mut persister = Persister::new(
            Box::new(MemoryStorage::new()),
            Some(Box::new(backup.clone())),
            Duration::from_millis(1000),
        );
        let t0 = Instant::now();
        let state = kanban_state();
        persister.record(&state, Changes::PREFS, t0);
        persister.record(&state, Changes::PREFS, t0 + Duration::from_millis(500));

        assert!(!persister.tick(&state, t0 + Duration::from_millis(1200)));
        assert!(persister.tick(&state, t0 + Duration::from_millis(1600)));
        assert!(!persister.tick(&state, t0 + Duration::from_secs(5)));
        assert_eq!(backup.pushes.borrow().len(), 1);
    }

    #[test]
    fn test_flush_skips_unchanged_snapshot() {
        let backup = RecordingBackup::default();
        let mut persister = Persister::new(
            Box::new(MemoryStorage::new()),
            Some(Box::new(backup.clone())),
            DEFAULT_BACKUP_DEBOUNCE,
        );
        let state = kanban_state();
        persister.record(&state, Changes::PREFS, Instant::now());
        assert!(persister.flush(&state));
        persister.record(&state, Changes::PREFS, Instant::now());
        assert!(!persister.flush(&state));
        assert!(!persister.flush(&state));
        assert_eq!(backup.pushes.borrow().len(), 1);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let backup = RecordingBackup {
            fail: true,
            ..Default::default()
        };
        let mut persister = Persister::new(
            Box::new(FailingStorage),
            Some(Box::new(backup)),
            DEFAULT_BACKUP_DEBOUNCE,
        );
        let state = kanban_state();
        persister.record(&state, Changes::ALL, Instant::now());
        assert!(!persister.flush(&state));
        assert!(persister.push_now(&state).is_err());
    }

    #[test]
    fn test_push_now_without_backup() {
        let mut persister =
            Persister::new(Box::new(MemoryStorage::new()), None, DEFAULT_BACKUP_DEBOUNCE);
        assert!(!persister.push_now(&BoardState::default()).unwrap());
    }
}
