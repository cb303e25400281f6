//! Configuration management for `discovery`.
//!
//! Configuration is loaded from `<data dir>/config.yaml` with support for:
//! - Command-line flags (highest precedence)
//! - Environment variables (`DISCOVERY_DIR`, `DISCOVERY_BACKUP_URL`)
//! - The YAML file
//! - Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use discovery_lib::persist::DEFAULT_BACKUP_DEBOUNCE;
use discovery_lib::{DiscoveryError, Result, SessionOptions, Thresholds};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Data directory used when neither `--dir` nor `DISCOVERY_DIR` is set.
pub const DEFAULT_DIR: &str = ".discovery";
pub const CONFIG_FILE: &str = "config.yaml";

/// Contents of `config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backup: BackupSection,
    pub score: ScoreSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSection {
    /// Base URL of a backup server exposing `/api/backup`.
    pub url: Option<String>,
    /// Backup file, relative to the data directory unless absolute.
    pub file: Option<PathBuf>,
    pub debounce_ms: u64,
}

impl Default for BackupSection {
    fn default() -> Self {
        Self {
            url: None,
            file: None,
            debounce_ms: u64::try_from(DEFAULT_BACKUP_DEBOUNCE.as_millis()).unwrap_or(1000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSection {
    pub medium: Option<f64>,
    pub high: Option<f64>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dir: Option<PathBuf>,
    pub backup_url: Option<String>,
    pub backup_file: Option<PathBuf>,
}

/// Where the backup goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupTarget {
    None,
    Http(String),
    File(PathBuf),
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub backup: BackupTarget,
    pub backup_debounce: Duration,
    pub thresholds: Thresholds,
}

impl Config {
    /// Resolve configuration for a run.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `config.yaml` cannot be read or parsed, or the
    /// score thresholds are invalid.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let data_dir = normalize(
            overrides
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR)),
        );
        let file = read_file_config(&data_dir.join(CONFIG_FILE))?;
        Self::resolve(data_dir, &file, overrides)
    }

    /// Combine a parsed file with overrides.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the score thresholds are invalid.
    pub fn resolve(data_dir: PathBuf, file: &FileConfig, overrides: &Overrides) -> Result<Self> {
        let backup = if let Some(url) = overrides.backup_url.as_deref() {
            BackupTarget::Http(url.to_string())
        } else if let Some(path) = overrides.backup_file.as_ref() {
            BackupTarget::File(normalize(path.clone()))
        } else if let Some(url) = file.backup.url.as_deref() {
            BackupTarget::Http(url.to_string())
        } else if let Some(path) = file.backup.file.as_ref() {
            BackupTarget::File(normalize(data_dir.join(path)))
        } else {
            BackupTarget::None
        };

        let defaults = Thresholds::DEFAULT;
        let thresholds = Thresholds::new(
            file.score.medium.unwrap_or(defaults.medium),
            file.score.high.unwrap_or(defaults.high),
        )?;

        let config = Self {
            data_dir,
            backup,
            backup_debounce: Duration::from_millis(file.backup.debounce_ms),
            thresholds,
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    #[must_use]
    pub const fn session_options(&self) -> SessionOptions {
        SessionOptions {
            backup_debounce: self.backup_debounce,
            thresholds: self.thresholds,
        }
    }
}

/// Parse `config.yaml`; a missing or comment-only file yields defaults.
///
/// # Errors
///
/// Returns `Config` on read or parse failure.
pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => {
            return Err(DiscoveryError::Config(format!(
                "{}: {e}",
                path.display()
            )));
        }
    };
    if contents.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    }) {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&contents)
        .map_err(|e| DiscoveryError::Config(format!("{}: {e}", path.display())))
}

/// Commented template written by `disc init`.
#[must_use]
pub const fn config_template() -> &'static str {
    r"# Discovery board configuration
#
# backup:
#   url: http://localhost:5173   # POST/GET <url>/api/backup
#   file: backup.json            # relative to this directory
#   debounce_ms: 1000
#
# score:
#   medium: 1.0                  # scores >= medium are yellow
#   high: 2.0                    # scores >= high are green
"
}

fn normalize(path: PathBuf) -> PathBuf {
    dunce::canonicalize(&path).unwrap_or_else(|_| dunce::simplified(&path).to_path_buf())
}
