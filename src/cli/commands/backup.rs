use anyhow::{Result, bail};
use discovery_lib::Session;
use serde::Serialize;
use tracing::info;

use super::Context;
use crate::cli::BackupSubcommand;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupOutput {
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pushed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ideas: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    projects: Option<usize>,
}

/// Execute a backup subcommand.
///
/// # Errors
///
/// Returns an error if no backup is configured or the transport fails.
pub fn execute(command: &BackupSubcommand, session: &mut Session, ctx: &Context) -> Result<()> {
    let Some(target) = session.backup_target() else {
        bail!("no backup configured; set backup.url or backup.file in config.yaml");
    };

    let mut output = BackupOutput {
        target,
        pushed: None,
        exists: None,
        ideas: None,
        projects: None,
    };

    match command {
        BackupSubcommand::Push => {
            let pushed = session.push_backup()?;
            info!(target = %output.target, pushed, "Backup push");
            output.pushed = Some(pushed);
        }
        BackupSubcommand::Pull => {
            let snapshot = session.fetch_backup()?;
            output.exists = Some(snapshot.is_some());
            if let Some(snapshot) = snapshot {
                output.ideas = Some(snapshot.ideas.len());
                output.projects = Some(snapshot.projects.len());
            }
        }
    }

    if ctx.json {
        return ctx.print_json(&output);
    }
    match (output.pushed, output.exists) {
        (Some(_), _) => println!("Backed up to {}", output.target),
        (None, Some(true)) => println!(
            "Backup at {}: {} projects, {} ideas",
            output.target,
            output.projects.unwrap_or_default(),
            output.ideas.unwrap_or_default()
        ),
        (None, _) => println!("No backup stored at {}", output.target),
    }
    Ok(())
}
