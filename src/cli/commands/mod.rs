//! Command implementations.
//!
//! Every board command receives the opened [`Session`] and a [`Context`]
//! carrying output settings. Ids are resolved here; an id that matches
//! nothing leaves the board untouched and the command still succeeds.

pub mod backup;
pub mod board;
pub mod completions;
pub mod drag;
pub mod idea;
pub mod init;
pub mod prefs;
pub mod project;
pub mod table;
pub mod version;

use std::io::IsTerminal;

use anyhow::Result;
use discovery_lib::{DiscoveryError, FileStorage, Outcome, Session};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::format::ChangeOutput;
use crate::sync;

/// Output settings shared by all commands.
#[derive(Debug)]
pub struct Context {
    pub json: bool,
    pub color: bool,
    pub config: Config,
}

impl Context {
    #[must_use]
    pub fn new(json: bool, config: Config) -> Self {
        let color =
            !json && std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self {
            json,
            color,
            config,
        }
    }

    /// Print a value as pretty JSON on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Report a mutation: JSON summary, the text message, or a note on
    /// stderr when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn report(
        &self,
        command: &str,
        outcome: &Outcome,
        message: impl FnOnce() -> String,
    ) -> Result<()> {
        if self.json {
            return self.print_json(&ChangeOutput::new(command, outcome));
        }
        if outcome.is_noop() {
            eprintln!("Nothing changed.");
        } else {
            println!("{}", message());
        }
        Ok(())
    }
}

/// Open the board stored under the configured data directory.
#[must_use]
pub fn open_session(config: &Config) -> Session {
    let storage = FileStorage::new(config.data_dir.clone());
    let backup = sync::transport_for(&config.backup);
    let session = Session::open(Box::new(storage), backup, config.session_options());
    debug!(
        dir = %config.data_dir.display(),
        source = session.load_source().as_str(),
        "Board loaded"
    );
    session
}

/// Turn a lookup miss into `None` so the caller can skip the mutation.
///
/// # Errors
///
/// Passes through every error except not-found, e.g. an ambiguous id.
pub fn found(result: discovery_lib::Result<String>) -> Result<Option<String>> {
    match result {
        Ok(id) => Ok(Some(id)),
        Err(DiscoveryError::IdeaNotFound { id } | DiscoveryError::ProjectNotFound { id }) => {
            eprintln!("No match for '{id}'.");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// The project a command works on: `--project` if given, else the active one.
///
/// # Errors
///
/// Returns an error if `--project` is ambiguous.
pub fn target_project(session: &Session, explicit: Option<&str>) -> Result<Option<String>> {
    match explicit {
        Some(input) => found(session.state().projects.resolve_id(input)),
        None => Ok(session.state().active_project().map(|p| p.id.clone())),
    }
}

/// Collapse form validation errors into one command error.
#[must_use]
pub fn invalid(errors: Vec<discovery_lib::error::ValidationError>) -> anyhow::Error {
    DiscoveryError::from(errors).into()
}
