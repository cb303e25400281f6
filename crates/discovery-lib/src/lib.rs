//! `discovery-lib` — In-process RICE idea board.
//!
//! Ideas are grouped under projects, scored with RICE (Reach, Impact,
//! Confidence, Effort) and organized through two views: a sortable table
//! and a six-column kanban board. All state lives in memory; the three
//! persisted buckets (ideas, projects, preferences) go through the
//! [`Storage`] trait, with an optional best-effort [`BackupTransport`].
//!
//! # Quick Start
//!
//! ```no_run
//! use discovery_lib::{Command, MemoryStorage, Session, SessionOptions};
//! use discovery_lib::{IdeaDraft, ProjectDraft};
//!
//! let mut session = Session::open(Box::new(MemoryStorage::new()), None, SessionOptions::default());
//!
//! let project_id = session
//!     .dispatch(Command::AddProject {
//!         draft: ProjectDraft { name: "Roadmap".into(), description: String::new() },
//!     })
//!     .created
//!     .expect("project created");
//! session.dispatch(Command::SetActiveProject { id: Some(project_id.clone()) });
//!
//! session.dispatch(Command::AddIdea {
//!     project_id,
//!     draft: IdeaDraft { title: "Dark mode".into(), ..Default::default() },
//! });
//!
//! for idea in session.table() {
//!     println!("{} {}", idea.rice_score, idea.title);
//! }
//!
//! // Push any pending backup before exit
//! session.flush();
//! ```

pub mod drag;
pub mod error;
pub mod ideas;
pub mod model;
pub mod persist;
pub mod projects;
pub mod query;
pub mod rice;
pub mod session;
pub mod storage;
pub mod store;
pub mod util;
pub mod view;

pub use drag::{DragController, DragState, DropTarget, SENTINEL_LAST, Surface};
pub use error::{DiscoveryError, Result};
pub use ideas::IdeaStore;
pub use model::{Idea, Impact, Prefs, Project, SortMode, Status, ViewMode};
pub use projects::ProjectStore;
pub use query::{
    IdeaDraft, IdeaPatch, ProjectDraft, ProjectPatch, SortColumn, SortDirection, TableSort,
};
pub use rice::{ScoreLevel, Thresholds};
pub use session::{Session, SessionOptions};
pub use storage::{
    BackupSnapshot, BackupTransport, Bucket, FileBackup, FileStorage, LoadSource, MemoryStorage,
    Storage,
};
pub use store::{BoardState, Changes, Command, Outcome, Store};
pub use view::KanbanBoard;
