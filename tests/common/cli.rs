use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use assert_cmd::cargo::CommandCargoExt;
use tempfile::TempDir;

/// A scratch directory with its own board data directory.
pub struct DiscWorkspace {
    temp: TempDir,
    data_dir: PathBuf,
}

impl DiscWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let data_dir = temp.path().join(".discovery");
        Self { temp, data_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn bucket(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.data_dir.join(format!("{key}.json"))).ok()
    }

    /// A `disc` command bound to this workspace, with ambient settings cleared.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("disc").expect("disc binary");
        cmd.current_dir(self.root())
            .env("DISCOVERY_DIR", &self.data_dir)
            .env("NO_COLOR", "1")
            .env_remove("DISCOVERY_BACKUP_URL")
            .env_remove("RUST_LOG");
        cmd
    }
}

pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }
}

/// Run `disc` in the workspace. `label` names the step in failure output.
pub fn run_disc<I, S>(workspace: &DiscWorkspace, args: I, label: &str) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = workspace
        .command()
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to run disc: {e}"));
    RunOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

/// Run `disc` and fail the test unless it exits successfully.
pub fn run_ok<I, S>(workspace: &DiscWorkspace, args: I, label: &str) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let out = run_disc(workspace, args, label);
    assert!(
        out.status.success(),
        "{label} failed\nstdout: {}\nstderr: {}",
        out.stdout,
        out.stderr
    );
    out
}

/// Create a project, make it active and return its id.
pub fn open_project(workspace: &DiscWorkspace, name: &str) -> String {
    let out = run_ok(
        workspace,
        ["--json", "project", "add", name, "--open"],
        "project add",
    );
    out.json()["created"]
        .as_str()
        .expect("created id")
        .to_string()
}

/// Add an idea to the active project and return its id.
pub fn add_idea(workspace: &DiscWorkspace, args: &[&str]) -> String {
    let mut full = vec!["--json", "idea", "add"];
    full.extend_from_slice(args);
    let out = run_ok(workspace, full, "idea add");
    out.json()["created"]
        .as_str()
        .expect("created id")
        .to_string()
}
