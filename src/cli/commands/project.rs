use anyhow::Result;
use discovery_lib::view::idea_counts;
use discovery_lib::{Command, Outcome, ProjectDraft, ProjectPatch, Session};
use tracing::info;

use super::{Context, found, invalid};
use crate::cli::ProjectSubcommand;
use crate::format::{ProjectWithCount, render_projects};
use crate::validation::ProjectValidator;

/// Execute a project subcommand.
///
/// # Errors
///
/// Returns an error on invalid input, an ambiguous id or a JSON failure.
pub fn execute(command: &ProjectSubcommand, session: &mut Session, ctx: &Context) -> Result<()> {
    match command {
        ProjectSubcommand::Add {
            name,
            description,
            open,
        } => add(name, description, *open, session, ctx),
        ProjectSubcommand::List => list(session, ctx),
        ProjectSubcommand::Edit {
            id,
            name,
            description,
        } => edit(id, name.clone(), description.clone(), session, ctx),
        ProjectSubcommand::Delete { id } => delete(id, session, ctx),
        ProjectSubcommand::Open { id } => {
            let Some(id) = found(session.state().projects.resolve_id(id))? else {
                return ctx.report("project open", &Outcome::default(), String::new);
            };
            let outcome = session.dispatch(Command::SetActiveProject {
                id: Some(id.clone()),
            });
            ctx.report("project open", &outcome, || format!("Opened project {id}"))
        }
        ProjectSubcommand::Close => {
            let outcome = session.dispatch(Command::SetActiveProject { id: None });
            ctx.report("project close", &outcome, || "Closed project".to_string())
        }
    }
}

fn add(
    name: &str,
    description: &str,
    open: bool,
    session: &mut Session,
    ctx: &Context,
) -> Result<()> {
    let draft = ProjectDraft {
        name: name.trim().to_string(),
        description: description.to_string(),
    };
    ProjectValidator::validate_draft(&draft).map_err(invalid)?;

    let mut outcome = session.dispatch(Command::AddProject { draft });
    if open {
        if let Some(id) = outcome.created.clone() {
            let opened = session.dispatch(Command::SetActiveProject { id: Some(id) });
            outcome.changes |= opened.changes;
        }
    }
    info!(id = ?outcome.created, "Created project");
    ctx.report("project add", &outcome, || {
        format!(
            "Created project {}: {}",
            outcome.created.as_deref().unwrap_or_default(),
            name.trim()
        )
    })
}

fn list(session: &Session, ctx: &Context) -> Result<()> {
    let state = session.state();
    let active = state.prefs.active_project_id.as_deref();
    let projects: Vec<ProjectWithCount> = idea_counts(state)
        .into_iter()
        .map(|(project, idea_count)| ProjectWithCount {
            active: active == Some(project.id.as_str()),
            project: project.clone(),
            idea_count,
        })
        .collect();

    if ctx.json {
        return ctx.print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects. Create one with `disc project add <name>`.");
    } else {
        print!("{}", render_projects(&projects));
    }
    Ok(())
}

fn edit(
    id: &str,
    name: Option<String>,
    description: Option<String>,
    session: &mut Session,
    ctx: &Context,
) -> Result<()> {
    let patch = ProjectPatch {
        name: name.map(|n| n.trim().to_string()),
        description,
    };
    ProjectValidator::validate_patch(&patch).map_err(invalid)?;

    let Some(id) = found(session.state().projects.resolve_id(id))? else {
        return ctx.report("project edit", &Outcome::default(), String::new);
    };
    let outcome = session.dispatch(Command::UpdateProject {
        id: id.clone(),
        patch,
    });
    ctx.report("project edit", &outcome, || format!("Updated project {id}"))
}

fn delete(id: &str, session: &mut Session, ctx: &Context) -> Result<()> {
    let Some(id) = found(session.state().projects.resolve_id(id))? else {
        return ctx.report("project delete", &Outcome::default(), String::new);
    };
    let removed = session.state().ideas.in_project(&id).count();
    let outcome = session.dispatch(Command::DeleteProject { id: id.clone() });
    ctx.report("project delete", &outcome, || {
        let noun = if removed == 1 { "idea" } else { "ideas" };
        format!("Deleted project {id} and {removed} {noun}")
    })
}
