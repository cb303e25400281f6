//! Persistence backends and load-time repair.
//!
//! The board persists three independent buckets, each a JSON document:
//! `discovery-ideas` (array of ideas), `discovery-projects` (array of
//! projects) and `discovery-prefs` (view preferences). Backends implement
//! [`Storage`]; a [`BackupTransport`] mirrors all three as one
//! [`BackupSnapshot`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DiscoveryError, Result};
use crate::ideas::IdeaStore;
use crate::model::{Idea, Prefs, Project};
use crate::projects::ProjectStore;
use crate::store::{BoardState, Changes};
use crate::util::generate_id;

/// Project that collects ideas saved before projects existed.
pub const MIGRATION_PROJECT_NAME: &str = "My Ideas";
const MIGRATION_PROJECT_DESCRIPTION: &str = "Migrated ideas";

/// A persisted bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Ideas,
    Projects,
    Prefs,
}

impl Bucket {
    pub const ALL: [Self; 3] = [Self::Ideas, Self::Projects, Self::Prefs];

    /// Storage key, shared with the browser version of the board.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Ideas => "discovery-ideas",
            Self::Projects => "discovery-projects",
            Self::Prefs => "discovery-prefs",
        }
    }

    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.json", self.key())
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Key-value storage for the three buckets.
pub trait Storage {
    /// Raw contents of a bucket, `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, bucket: Bucket) -> Result<Option<String>>;

    /// Replace the contents of a bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&mut self, bucket: Bucket, contents: &str) -> Result<()>;
}

/// One `<key>.json` file per bucket in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, bucket: Bucket) -> PathBuf {
        self.dir.join(bucket.file_name())
    }
}

impl Storage for FileStorage {
    fn read(&self, bucket: Bucket) -> Result<Option<String>> {
        read_optional(&self.path(bucket))
    }

    fn write(&mut self, bucket: Bucket, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_atomic(&self.path(bucket), contents)
    }
}

/// In-memory buckets. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    buckets: Rc<RefCell<HashMap<Bucket, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of a bucket.
    #[must_use]
    pub fn get(&self, bucket: Bucket) -> Option<String> {
        self.buckets.borrow().get(&bucket).cloned()
    }

    pub fn insert(&self, bucket: Bucket, contents: impl Into<String>) {
        self.buckets.borrow_mut().insert(bucket, contents.into());
    }
}

impl Storage for MemoryStorage {
    fn read(&self, bucket: Bucket) -> Result<Option<String>> {
        Ok(self.get(bucket))
    }

    fn write(&mut self, bucket: Bucket, contents: &str) -> Result<()> {
        self.insert(bucket, contents);
        Ok(())
    }
}

// ============================================================================
// Backup
// ============================================================================

/// All three buckets in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    #[serde(default)]
    pub ideas: Vec<Idea>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub prefs: Prefs,
}

impl BackupSnapshot {
    #[must_use]
    pub fn from_state(state: &BoardState) -> Self {
        Self {
            ideas: state.ideas.as_slice().to_vec(),
            projects: state.projects.as_slice().to_vec(),
            prefs: state.prefs.clone(),
        }
    }

    #[must_use]
    pub fn into_state(self) -> BoardState {
        BoardState::new(
            IdeaStore::from_ideas(self.ideas),
            ProjectStore::from_projects(self.projects),
            self.prefs,
        )
    }
}

/// Best-effort remote copy of the board.
pub trait BackupTransport {
    /// The stored snapshot, `None` if no backup exists yet.
    ///
    /// # Errors
    ///
    /// Returns `Backup` if the transport fails or the snapshot is malformed.
    fn fetch(&self) -> Result<Option<BackupSnapshot>>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Backup` if the transport fails.
    fn push(&self, snapshot: &BackupSnapshot) -> Result<()>;

    /// Where backups go, for log and status messages.
    fn describe(&self) -> String;
}

/// Backup kept in a local JSON file.
#[derive(Debug, Clone)]
pub struct FileBackup {
    path: PathBuf,
}

impl FileBackup {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BackupTransport for FileBackup {
    fn fetch(&self) -> Result<Option<BackupSnapshot>> {
        let Some(contents) = read_optional(&self.path)? else {
            return Ok(None);
        };
        serde_json::from_str(&contents).map(Some).map_err(|e| {
            DiscoveryError::Backup(format!("{}: {e}", self.path.display()))
        })
    }

    fn push(&self, snapshot: &BackupSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&self.path, &json)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// Load
// ============================================================================

/// Where the loaded state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Local,
    Backup,
    Empty,
}

impl LoadSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Backup => "backup",
            Self::Empty => "empty",
        }
    }
}

/// Loaded state plus the buckets that must be written back.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub state: BoardState,
    pub repaired: Changes,
    pub source: LoadSource,
}

/// True when none of the buckets has ever been written.
///
/// A read failure counts as not empty, so a broken backend never triggers
/// backup recovery over existing data.
#[must_use]
pub fn local_is_empty(storage: &dyn Storage) -> bool {
    Bucket::ALL
        .into_iter()
        .all(|bucket| matches!(storage.read(bucket), Ok(None)))
}

/// Load the board from local storage.
///
/// Never fails: unreadable or malformed buckets fall back to the empty
/// initial state. Orphaned ideas are assigned to the "My Ideas" project.
#[must_use]
pub fn load(storage: &dyn Storage, now: DateTime<Utc>) -> Loaded {
    match load_buckets(storage) {
        Ok(Some(state)) => {
            let (state, repaired) = repair(state, now);
            Loaded {
                state,
                repaired,
                source: LoadSource::Local,
            }
        }
        Ok(None) => empty(),
        Err(e) => {
            warn!(error = %e, "Failed to load stored board; starting empty");
            empty()
        }
    }
}

/// Turn a recovered backup into local state. Every bucket is marked for
/// writing so the recovery lands in local storage.
#[must_use]
pub fn from_backup(snapshot: BackupSnapshot, now: DateTime<Utc>) -> Loaded {
    let (state, _) = repair(snapshot.into_state(), now);
    Loaded {
        state,
        repaired: Changes::ALL,
        source: LoadSource::Backup,
    }
}

fn empty() -> Loaded {
    Loaded {
        state: BoardState::default(),
        repaired: Changes::NONE,
        source: LoadSource::Empty,
    }
}

fn load_buckets(storage: &dyn Storage) -> Result<Option<BoardState>> {
    let ideas = storage.read(Bucket::Ideas)?;
    let projects = storage.read(Bucket::Projects)?;
    let prefs = storage.read(Bucket::Prefs)?;
    if ideas.is_none() && projects.is_none() && prefs.is_none() {
        return Ok(None);
    }

    let ideas: Vec<Idea> = parse_bucket(Bucket::Ideas, ideas.as_deref())?;
    let projects: Vec<Project> = parse_bucket(Bucket::Projects, projects.as_deref())?;
    let prefs: Prefs = parse_bucket(Bucket::Prefs, prefs.as_deref())?;
    debug!(
        ideas = ideas.len(),
        projects = projects.len(),
        "Loaded buckets"
    );

    Ok(Some(BoardState::new(
        IdeaStore::from_ideas(ideas),
        ProjectStore::from_projects(projects),
        prefs,
    )))
}

fn parse_bucket<T>(bucket: Bucket, contents: Option<&str>) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match contents {
        None => Ok(T::default()),
        Some(raw) if raw.trim().is_empty() || raw.trim() == "null" => Ok(T::default()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| DiscoveryError::Storage(format!("{bucket}: {e}"))),
    }
}

/// Assign ideas without a project to "My Ideas", creating it if needed.
#[must_use]
pub fn repair(state: BoardState, now: DateTime<Utc>) -> (BoardState, Changes) {
    let orphans = state.ideas.iter().filter(|i| i.is_orphan()).count();
    if orphans == 0 {
        return (state, Changes::NONE);
    }

    let BoardState {
        ideas,
        projects,
        prefs,
    } = state;
    let mut changes = Changes::IDEAS;

    let existing = projects
        .find_by_name(MIGRATION_PROJECT_NAME)
        .map(|p| p.id.clone());
    let (projects, home) = match existing {
        Some(id) => (projects, id),
        None => {
            let id = generate_id(
                "proj",
                MIGRATION_PROJECT_NAME,
                now,
                projects.len(),
                |id| projects.contains(id),
            );
            let draft = crate::query::ProjectDraft {
                name: MIGRATION_PROJECT_NAME.to_string(),
                description: MIGRATION_PROJECT_DESCRIPTION.to_string(),
            };
            changes |= Changes::PROJECTS;
            (projects.add(&draft, id.clone(), now), id)
        }
    };

    let ideas: Vec<Idea> = ideas
        .into_vec()
        .into_iter()
        .map(|mut idea| {
            if idea.is_orphan() {
                idea.project_id.clone_from(&home);
            }
            idea
        })
        .collect();

    info!(count = orphans, project = %home, "Migrated orphaned ideas");
    (
        BoardState::new(IdeaStore::from_ideas(ideas), projects, prefs),
        changes,
    )
}

/// Serialize one bucket of a state.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn encode(state: &BoardState, bucket: Bucket) -> Result<String> {
    let json = match bucket {
        Bucket::Ideas => serde_json::to_string(state.ideas.as_slice())?,
        Bucket::Projects => serde_json::to_string(state.projects.as_slice())?,
        Bucket::Prefs => serde_json::to_string(&state.prefs)?,
    };
    Ok(json)
}

// ============================================================================
// File helpers
// ============================================================================

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DiscoveryError::Io(e)),
    }
}

/// Write via temp file + rename.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Impact, SortMode, Status, ViewMode};
    use crate::query::{IdeaDraft, ProjectDraft};
    use crate::store::{Command, Store};

    fn sample_state() -> BoardState {
        let mut store = Store::default();
        let project = store
            .dispatch(Command::AddProject {
                draft: ProjectDraft {
                    name: "Alpha".into(),
                    description: "first".into(),
                },
            })
            .created
            .unwrap();
        store.dispatch(Command::SetActiveProject {
            id: Some(project.clone()),
        });
        store.dispatch(Command::SetViewMode {
            mode: ViewMode::Kanban,
        });
        for (title, impact, effort) in [
            ("Dark mode", Impact::Minimal, 3.0),
            ("Export", Impact::Massive, 7.5),
        ] {
            store.dispatch(Command::AddIdea {
                project_id: project.clone(),
                draft: IdeaDraft {
                    title: title.into(),
                    impact,
                    effort,
                    confidence: 33.0,
                    status: Status::InProgress,
                    ..Default::default()
                },
            });
        }
        store.into_state()
    }

    fn save_all(storage: &mut dyn Storage, state: &BoardState) {
        for bucket in Bucket::ALL {
            storage.write(bucket, &encode(state, bucket).unwrap()).unwrap();
        }
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("data"));
        let state = sample_state();
        save_all(&mut storage, &state);

        assert!(storage.path(Bucket::Ideas).exists());
        assert!(!dir.path().join("data/discovery-ideas.json.tmp").exists());

        let loaded = load(&storage, Utc::now());
        assert_eq!(loaded.source, LoadSource::Local);
        assert_eq!(loaded.repaired, Changes::NONE);
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn test_missing_buckets_load_empty() {
        let storage = MemoryStorage::new();
        assert!(local_is_empty(&storage));
        let loaded = load(&storage, Utc::now());
        assert_eq!(loaded.source, LoadSource::Empty);
        assert_eq!(loaded.state, BoardState::default());
    }

    #[test]
    fn test_malformed_bucket_falls_back_to_empty() {
        let storage = MemoryStorage::new();
        let state = sample_state();
        storage.insert(Bucket::Projects, encode(&state, Bucket::Projects).unwrap());
        storage.insert(Bucket::Ideas, "[{not json");

        assert!(!local_is_empty(&storage));
        let loaded = load(&storage, Utc::now());
        assert_eq!(loaded.source, LoadSource::Empty);
        assert!(loaded.state.projects.is_empty());
    }

    #[test]
    fn test_browser_prefs_without_table_sort() {
        let storage = MemoryStorage::new();
        storage.insert(
            Bucket::Prefs,
            r#"{"viewMode":"table","sortMode":"manual","activeProjectId":null}"#,
        );
        let loaded = load(&storage, Utc::now());
        assert_eq!(loaded.source, LoadSource::Local);
        assert_eq!(loaded.state.prefs.sort_mode, SortMode::Manual);
    }

    #[test]
    fn test_orphans_get_new_my_ideas_project() {
        let storage = MemoryStorage::new();
        storage.insert(
            Bucket::Ideas,
            r#"[{"id":"a","title":"Legacy","reach":5,"impact":1,"confidence":80,"effort":4,
                "riceScore":1,"status":"todo","order":0,
                "createdAt":"2024-05-01T10:00:00Z","updatedAt":"2024-05-01T10:00:00Z"}]"#,
        );
        let loaded = load(&storage, Utc::now());
        assert_eq!(loaded.repaired, Changes::IDEAS | Changes::PROJECTS);

        let home = loaded
            .state
            .projects
            .find_by_name(MIGRATION_PROJECT_NAME)
            .unwrap();
        assert_eq!(home.description, "Migrated ideas");
        assert_eq!(loaded.state.ideas.get("a").unwrap().project_id, home.id);
    }

    #[test]
    fn test_orphans_join_existing_my_ideas_project() {
        let mut state = sample_state();
        let existing = state
            .projects
            .add(
                &ProjectDraft {
                    name: MIGRATION_PROJECT_NAME.into(),
                    description: String::new(),
                },
                "proj-home".into(),
                Utc::now(),
            );
        state.projects = existing;
        let mut ideas = state.ideas.as_slice().to_vec();
        ideas[0].project_id = String::new();
        state.ideas = IdeaStore::from_ideas(ideas);

        let (repaired, changes) = repair(state.clone(), Utc::now());
        assert_eq!(changes, Changes::IDEAS);
        assert_eq!(repaired.projects.len(), state.projects.len());
        assert!(repaired.ideas.iter().all(|i| !i.is_orphan()));
        assert_eq!(repaired.ideas.as_slice()[0].project_id, "proj-home");
    }

    #[test]
    fn test_file_backup_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backup = FileBackup::new(dir.path().join("nested/backup.json"));
        assert!(backup.fetch().unwrap().is_none());

        let snapshot = BackupSnapshot::from_state(&sample_state());
        backup.push(&snapshot).unwrap();
        assert_eq!(backup.fetch().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_file_backup_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        fs::write(&path, "nope").unwrap();
        assert!(matches!(
            FileBackup::new(path).fetch(),
            Err(DiscoveryError::Backup(_))
        ));
    }

    #[test]
    fn test_from_backup_marks_everything_dirty() {
        let state = sample_state();
        let loaded = from_backup(BackupSnapshot::from_state(&state), Utc::now());
        assert_eq!(loaded.source, LoadSource::Backup);
        assert_eq!(loaded.repaired, Changes::ALL);
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn test_memory_storage_clones_share_buckets() {
        let storage = MemoryStorage::new();
        let mut writer: Box<dyn Storage> = Box::new(storage.clone());
        writer.write(Bucket::Prefs, "{}").unwrap();
        assert_eq!(storage.get(Bucket::Prefs).as_deref(), Some("{}"));
    }
}
