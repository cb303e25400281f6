//! Error types for `discovery-lib`.
//!
//! Store transitions never fail (a missing id is a no-op). Errors come from
//! parsing user input, resolving ids, and the storage and backup layers.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Idea not found: {id}")]
    IdeaNotFound { id: String },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: String },

    /// A partial id that matches more than one record.
    #[error("Ambiguous ID '{partial}': matches {}", .matches.join(", "))]
    AmbiguousId {
        partial: String,
        matches: Vec<String>,
    },

    /// One or more form fields were rejected.
    #[error("Invalid input: {}", join_fields(.errors))]
    Invalid { errors: Vec<ValidationError> },

    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Impact outside the fixed multiplier set.
    #[error("Invalid impact: {value} (expected 0.25, 0.5, 1, 2 or 3)")]
    InvalidImpact { value: String },

    #[error("Invalid sort column: {column}")]
    InvalidSortColumn { column: String },

    /// Unknown view or sort mode.
    #[error("Invalid mode: {mode}")]
    InvalidMode { mode: String },

    #[error("Invalid drop target: {target}")]
    InvalidDropTarget { target: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// A bucket could not be read or decoded.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The remote copy could not be fetched or written.
    #[error("Backup error: {0}")]
    Backup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rejected form field and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

impl From<Vec<ValidationError>> for DiscoveryError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Invalid { errors }
    }
}

fn join_fields(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
