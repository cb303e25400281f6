//! Form validation for `disc`.
//!
//! These routines check user input before it reaches the store and return
//! every problem found, so a form can report all bad fields at once.

use discovery_lib::error::ValidationError;
use discovery_lib::{IdeaDraft, IdeaPatch, ProjectDraft, ProjectPatch};
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_TITLE_LEN: usize = 500;
const MAX_DESCRIPTION_LEN: usize = 102_400;

/// Accepted drop target spellings: `column:<status>` or `column-<status>`.
static COLUMN_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^column[:-][a-z_]+$").expect("static regex"));

/// Validates idea forms.
pub struct IdeaValidator;

impl IdeaValidator {
    /// Validate a new idea.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_draft(draft: &IdeaDraft) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_title(&mut errors, "title", &draft.title);
        check_description(&mut errors, &draft.description);
        check_reach(&mut errors, draft.reach);
        check_confidence(&mut errors, draft.confidence);
        check_effort(&mut errors, draft.effort);
        finish(errors)
    }

    /// Validate the fields present in an edit.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_patch(patch: &IdeaPatch) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(title) = patch.title.as_deref() {
            check_title(&mut errors, "title", title);
        }
        if let Some(description) = patch.description.as_deref() {
            check_description(&mut errors, description);
        }
        if let Some(reach) = patch.reach {
            check_reach(&mut errors, reach);
        }
        if let Some(confidence) = patch.confidence {
            check_confidence(&mut errors, confidence);
        }
        if let Some(effort) = patch.effort {
            check_effort(&mut errors, effort);
        }
        finish(errors)
    }
}

/// Validates project forms.
pub struct ProjectValidator;

impl ProjectValidator {
    /// Validate a new project.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if the name is blank or too long.
    pub fn validate_draft(draft: &ProjectDraft) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_title(&mut errors, "name", &draft.name);
        check_description(&mut errors, &draft.description);
        finish(errors)
    }

    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if a present field is invalid.
    pub fn validate_patch(patch: &ProjectPatch) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Some(name) = patch.name.as_deref() {
            check_title(&mut errors, "name", name);
        }
        if let Some(description) = patch.description.as_deref() {
            check_description(&mut errors, description);
        }
        finish(errors)
    }
}

fn check_title(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, "cannot be empty"));
    }
    if value.len() > MAX_TITLE_LEN {
        errors.push(ValidationError::new(field, "exceeds 500 characters"));
    }
}

fn check_description(errors: &mut Vec<ValidationError>, value: &str) {
    if value.len() > MAX_DESCRIPTION_LEN {
        errors.push(ValidationError::new("description", "exceeds 100KB"));
    }
}

fn check_reach(errors: &mut Vec<ValidationError>, reach: f64) {
    if !(1.0..=10.0).contains(&reach) {
        errors.push(ValidationError::new("reach", "must be between 1 and 10"));
    }
}

fn check_confidence(errors: &mut Vec<ValidationError>, confidence: f64) {
    if !(0.0..=100.0).contains(&confidence) {
        errors.push(ValidationError::new(
            "confidence",
            "must be between 0 and 100",
        ));
    }
}

fn check_effort(errors: &mut Vec<ValidationError>, effort: f64) {
    // NaN fails the comparison too.
    if !(effort > 0.0 && effort.is_finite()) {
        errors.push(ValidationError::new("effort", "must be greater than 0"));
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True if `target` names a kanban column rather than a card.
#[must_use]
pub fn is_column_target(target: &str) -> bool {
    COLUMN_TARGET.is_match(target)
}
