//! View and sort preferences.

use anyhow::Result;
use discovery_lib::{Command, Session, SortMode, ViewMode};

use super::Context;

/// # Errors
///
/// Returns an error if JSON output fails.
pub fn set_view(mode: ViewMode, session: &mut Session, ctx: &Context) -> Result<()> {
    let outcome = session.dispatch(Command::SetViewMode { mode });
    ctx.report("view", &outcome, || format!("View set to {mode}"))
}

/// # Errors
///
/// Returns an error if JSON output fails.
pub fn set_sort(mode: SortMode, session: &mut Session, ctx: &Context) -> Result<()> {
    let outcome = session.dispatch(Command::SetSortMode { mode });
    ctx.report("sort", &outcome, || format!("Sort mode set to {mode}"))
}
