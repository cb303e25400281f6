//! Output formatting for `disc`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! With `--json`, clean JSON goes to stdout and diagnostics to stderr.
//!
//! # JSON Output Types
//!
//! - [`IdeaRow`] - Idea with its score band (table, show)
//! - [`KanbanColumnOutput`] - One kanban column with its cards (board)
//! - [`ProjectWithCount`] - Project with its idea count (project list)
//! - [`DragOutput`] - Result of a drag gesture
//! - [`ChangeOutput`] - Result of a single mutation

mod output;
mod text;

pub use output::{
    ChangeOutput, DragOutput, IdeaRow, KanbanColumnOutput, ProjectWithCount,
};
pub use text::{
    format_idea_line, format_impact, format_score, format_status_icon, render_kanban,
    render_projects, render_table, truncate_to_width,
};
