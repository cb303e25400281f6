use anyhow::{Result, bail};
use discovery_lib::{Command, DiscoveryError, IdeaDraft, IdeaPatch, Outcome, Session, Status};

use super::{Context, found, invalid, target_project};
use crate::cli::{IdeaAddArgs, IdeaEditArgs, IdeaSubcommand};
use crate::format::{IdeaRow, format_idea_line, format_impact, format_score};
use crate::validation::IdeaValidator;

/// Execute an idea subcommand.
///
/// # Errors
///
/// Returns an error on invalid input, an ambiguous id, a missing project
/// or a JSON failure.
pub fn execute(command: &IdeaSubcommand, session: &mut Session, ctx: &Context) -> Result<()> {
    match command {
        IdeaSubcommand::Add(args) => add(args, session, ctx),
        IdeaSubcommand::Edit(args) => edit(args, session, ctx),
        IdeaSubcommand::Delete { id } => {
            let Some(id) = found(session.state().ideas.resolve_id(id))? else {
                return ctx.report("idea delete", &Outcome::default(), String::new);
            };
            let outcome = session.dispatch(Command::DeleteIdea { id: id.clone() });
            ctx.report("idea delete", &outcome, || format!("Deleted idea {id}"))
        }
        IdeaSubcommand::Status { id, status } => change_status(id, *status, session, ctx),
        IdeaSubcommand::Show { id } => show(id, session, ctx),
    }
}

fn add(args: &IdeaAddArgs, session: &mut Session, ctx: &Context) -> Result<()> {
    let Some(project_id) = target_project(session, args.project.as_deref())? else {
        if args.project.is_some() {
            return ctx.report("idea add", &Outcome::default(), String::new);
        }
        bail!("no active project; run `disc project open <id>` or pass --project");
    };

    let defaults = IdeaDraft::default();
    let draft = IdeaDraft {
        title: args.title.trim().to_string(),
        description: args.description.clone().unwrap_or_default(),
        reach: args.reach.unwrap_or(defaults.reach),
        impact: args.impact.unwrap_or(defaults.impact),
        confidence: args.confidence.unwrap_or(defaults.confidence),
        effort: args.effort.unwrap_or(defaults.effort),
        status: args.status.unwrap_or(defaults.status),
    };
    IdeaValidator::validate_draft(&draft).map_err(invalid)?;

    let outcome = session.dispatch(Command::AddIdea { project_id, draft });
    ctx.report("idea add", &outcome, || {
        let created = outcome.created.as_deref().unwrap_or_default();
        session
            .state()
            .ideas
            .get(created)
            .map_or_else(|| format!("Created idea {created}"), format_idea_line)
    })
}

fn edit(args: &IdeaEditArgs, session: &mut Session, ctx: &Context) -> Result<()> {
    let patch = IdeaPatch {
        title: args.title.as_ref().map(|t| t.trim().to_string()),
        description: args.description.clone(),
        reach: args.reach,
        impact: args.impact,
        confidence: args.confidence,
        effort: args.effort,
        status: args.status,
    };
    IdeaValidator::validate_patch(&patch).map_err(invalid)?;

    let Some(id) = found(session.state().ideas.resolve_id(&args.id))? else {
        return ctx.report("idea edit", &Outcome::default(), String::new);
    };
    let outcome = session.dispatch(Command::UpdateIdea {
        id: id.clone(),
        patch,
    });
    ctx.report("idea edit", &outcome, || {
        session
            .state()
            .ideas
            .get(&id)
            .map_or_else(|| format!("Updated idea {id}"), format_idea_line)
    })
}

fn change_status(id: &str, status: Status, session: &mut Session, ctx: &Context) -> Result<()> {
    let Some(id) = found(session.state().ideas.resolve_id(id))? else {
        return ctx.report("idea status", &Outcome::default(), String::new);
    };
    // Direct status change: keeps the current order value.
    let outcome = session.dispatch(Command::ChangeStatus {
        id: id.clone(),
        status,
        order: None,
    });
    ctx.report("idea status", &outcome, || {
        format!("Moved idea {id} to {}", status.label())
    })
}

fn show(id: &str, session: &Session, ctx: &Context) -> Result<()> {
    let state = session.state();
    let id = state.ideas.resolve_id(id)?;
    let idea = state
        .ideas
        .get(&id)
        .ok_or(DiscoveryError::IdeaNotFound { id: id.clone() })?;
    let thresholds = session.thresholds();

    if ctx.json {
        return ctx.print_json(&IdeaRow::new(idea, &thresholds));
    }

    let project = state
        .projects
        .get(&idea.project_id)
        .map_or(idea.project_id.as_str(), |p| p.name.as_str());
    println!("{}", format_idea_line(idea));
    println!("  Project:    {project}");
    println!("  Status:     {}", idea.status.label());
    println!("  Reach:      {}", idea.reach);
    println!(
        "  Impact:     {} ({})",
        format_impact(idea.impact),
        idea.impact.label()
    );
    println!("  Confidence: {}%", idea.confidence);
    println!("  Effort:     {}h", idea.effort);
    println!(
        "  Score:      {}",
        format_score(idea.rice_score, thresholds.level(idea.rice_score), ctx.color)
    );
    if !idea.description.is_empty() {
        println!();
        println!("{}", idea.description);
    }
    Ok(())
}
