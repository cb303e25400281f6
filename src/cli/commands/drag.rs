use anyhow::Result;
use discovery_lib::{DropTarget, Session};
use tracing::debug;

use super::{Context, found};
use crate::cli::DragArgs;
use crate::format::{DragOutput, format_idea_line};
use crate::validation::is_column_target;

/// Execute the drag command: begin, hover over the target, then drop.
///
/// # Errors
///
/// Returns an error if the target cannot be parsed, an id is ambiguous or
/// JSON output fails.
pub fn execute(args: &DragArgs, session: &mut Session, ctx: &Context) -> Result<()> {
    let Some(id) = found(session.state().ideas.resolve_id(&args.id))? else {
        return report(args, session, ctx, DragOutput::skipped(&args.id, args));
    };

    // Card targets accept partial ids; an unknown card stays as typed and
    // the drop on it is a no-op.
    let target = if is_column_target(&args.over) {
        args.over.parse::<DropTarget>()?
    } else {
        let card = session
            .state()
            .ideas
            .resolve_id(&args.over)
            .unwrap_or_else(|_| args.over.trim().to_string());
        DropTarget::Card(card)
    };
    debug!(%id, ?target, surface = %args.surface, "Drag");

    let mut output = DragOutput::skipped(&id, args);
    output.started = session.drag_begin(args.surface, &id);
    if output.started {
        output.hover_changed = !session.drag_hover(&target).is_noop();
        if args.no_drop {
            session.drag_cancel();
        } else {
            output.drop_changed = !session.drag_drop(&target).is_noop();
        }
    } else {
        eprintln!(
            "Cannot drag {id} on the {} surface (table drags need manual sort mode).",
            args.surface
        );
    }
    output.idea = session.state().ideas.get(&id).cloned();
    report(args, session, ctx, output)
}

fn report(args: &DragArgs, session: &Session, ctx: &Context, output: DragOutput) -> Result<()> {
    if ctx.json {
        return ctx.print_json(&output);
    }
    if !output.hover_changed && !output.drop_changed {
        eprintln!("Nothing changed.");
        return Ok(());
    }
    if let Some(idea) = session.state().ideas.get(&output.id) {
        println!("{}", format_idea_line(idea));
        println!("  Status: {}  Order: {}", idea.status.label(), idea.order);
    } else {
        println!("Dragged {} over {}", output.id, args.over);
    }
    Ok(())
}

impl DragOutput {
    fn skipped(id: &str, args: &DragArgs) -> Self {
        Self {
            id: id.to_string(),
            surface: args.surface.to_string(),
            target: args.over.clone(),
            started: false,
            hover_changed: false,
            drop_changed: false,
            idea: None,
        }
    }
}
