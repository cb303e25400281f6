use anyhow::Result;
use discovery_lib::Session;
use discovery_lib::view::kanban_for_project;

use super::{Context, target_project};
use crate::cli::BoardArgs;
use crate::format::{KanbanColumnOutput, render_kanban};

/// Execute the board command.
///
/// # Errors
///
/// Returns an error if `--project` is ambiguous or JSON output fails.
pub fn execute(args: &BoardArgs, session: &Session, ctx: &Context) -> Result<()> {
    let Some(project_id) = target_project(session, args.project.as_deref())? else {
        if ctx.json {
            return ctx.print_json(&Vec::<KanbanColumnOutput>::new());
        }
        eprintln!("No active project. Open one with `disc project open <id>`.");
        return Ok(());
    };
    let board = kanban_for_project(session.state(), &project_id);
    let thresholds = session.thresholds();

    if ctx.json {
        return ctx.print_json(&KanbanColumnOutput::columns(&board, &thresholds));
    }
    print!("{}", render_kanban(&board, &thresholds, ctx.color));
    Ok(())
}
