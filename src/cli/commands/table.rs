use anyhow::Result;
use discovery_lib::view::table_for_project;
use discovery_lib::{Command, Session, SortDirection, TableSort};
use tracing::debug;

use super::{Context, target_project};
use crate::cli::TableArgs;
use crate::format::{IdeaRow, render_table};

/// Execute the table command.
///
/// `--sort` alone acts like a header click; with `--asc`/`--desc` the
/// direction is set explicitly.
///
/// # Errors
///
/// Returns an error if `--project` is ambiguous or JSON output fails.
pub fn execute(args: &TableArgs, session: &mut Session, ctx: &Context) -> Result<()> {
    let direction = if args.asc {
        Some(SortDirection::Asc)
    } else if args.desc {
        Some(SortDirection::Desc)
    } else {
        None
    };

    let current = session.state().prefs.table_sort;
    let command = match (args.sort, direction) {
        (Some(column), None) => Some(Command::ToggleTableSort { column }),
        (Some(column), Some(direction)) => Some(Command::SetTableSort {
            sort: TableSort::new(column, direction),
        }),
        (None, Some(direction)) => Some(Command::SetTableSort {
            sort: TableSort::new(current.column, direction),
        }),
        (None, None) => None,
    };
    if let Some(command) = command {
        let outcome = session.dispatch(command);
        debug!(changed = !outcome.is_noop(), "Applied table sort");
    }

    let state = session.state();
    let Some(project_id) = target_project(session, args.project.as_deref())? else {
        if ctx.json {
            return ctx.print_json(&Vec::<IdeaRow>::new());
        }
        eprintln!("No active project. Open one with `disc project open <id>`.");
        return Ok(());
    };
    let rows = table_for_project(state, &project_id);
    let thresholds = session.thresholds();

    if ctx.json {
        return ctx.print_json(&IdeaRow::rows(&rows, &thresholds));
    }
    if rows.is_empty() {
        println!("No ideas yet. Add one with `disc idea add <title>`.");
        return Ok(());
    }
    print!("{}", render_table(&rows, &thresholds, ctx.color));
    if !state.prefs.sort_mode.is_manual() {
        let sort = state.prefs.table_sort;
        println!(
            "\nSorted by {} {}",
            sort.column,
            sort.direction.as_str()
        );
    }
    Ok(())
}
