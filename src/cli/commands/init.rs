use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::config::{self, CONFIG_FILE, DEFAULT_DIR, Overrides};

#[derive(Serialize)]
struct InitOutput {
    dir: String,
    config_written: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or its files cannot be created.
pub fn execute(overrides: &Overrides, force: bool, json: bool) -> Result<()> {
    let dir = overrides
        .dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));

    fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;

    // Write config.yaml template
    let config_path = dir.join(CONFIG_FILE);
    let config_written = force || !config_path.exists();
    if config_written {
        fs::write(&config_path, config::config_template())?;
    }

    // Write .gitignore
    let gitignore_path = dir.join(".gitignore");
    if !gitignore_path.exists() {
        let gitignore = r"# Atomic write leftovers
*.tmp

# Logs
*.log
";
        fs::write(gitignore_path, gitignore)?;
    }

    let dir = dunce::canonicalize(&dir).unwrap_or(dir);
    if json {
        let output = InitOutput {
            dir: dir.display().to_string(),
            config_written,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Initialized discovery board in {}", dir.display());
    }
    Ok(())
}
