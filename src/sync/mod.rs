//! HTTP backup transport.
//!
//! Talks to a backup server exposing a single `/api/backup` endpoint:
//! - `GET` returns the last snapshot, or 404 when none was ever stored
//! - `POST` replaces the snapshot with the JSON body

use std::time::Duration;

use discovery_lib::{BackupSnapshot, BackupTransport, DiscoveryError, FileBackup, Result};
use tracing::{debug, trace};

use crate::config::BackupTarget;

const BACKUP_PATH: &str = "/api/backup";

/// Backup kept on a remote server.
#[derive(Clone)]
pub struct HttpBackup {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpBackup {
    /// Create a transport for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .timeout_connect(Some(Duration::from_secs(5)))
                .timeout_send_request(Some(Duration::from_secs(10)))
                .build(),
        );
        Self {
            endpoint: endpoint_for(base_url),
            agent,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpBackup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackup")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// `<base_url>/api/backup`, tolerating a trailing slash.
#[must_use]
pub fn endpoint_for(base_url: &str) -> String {
    format!("{}{BACKUP_PATH}", base_url.trim_end_matches('/'))
}

/// Build the transport for a configured target.
#[must_use]
pub fn transport_for(target: &BackupTarget) -> Option<Box<dyn BackupTransport>> {
    match target {
        BackupTarget::None => None,
        BackupTarget::Http(url) => Some(Box::new(HttpBackup::new(url))),
        BackupTarget::File(path) => Some(Box::new(FileBackup::new(path.clone()))),
    }
}

fn backup_error(endpoint: &str, err: &ureq::Error) -> DiscoveryError {
    DiscoveryError::Backup(format!("{endpoint}: {err}"))
}

impl BackupTransport for HttpBackup {
    fn fetch(&self) -> Result<Option<BackupSnapshot>> {
        trace!(endpoint = %self.endpoint, "Fetching backup");
        let mut response = match self.agent.get(&self.endpoint).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(404)) => {
                debug!(endpoint = %self.endpoint, "No backup stored");
                return Ok(None);
            }
            Err(e) => return Err(backup_error(&self.endpoint, &e)),
        };
        response
            .body_mut()
            .read_json::<BackupSnapshot>()
            .map(Some)
            .map_err(|e| backup_error(&self.endpoint, &e))
    }

    fn push(&self, snapshot: &BackupSnapshot) -> Result<()> {
        trace!(endpoint = %self.endpoint, ideas = snapshot.ideas.len(), "Pushing backup");
        self.agent
            .post(&self.endpoint)
            .send_json(snapshot)
            .map_err(|e| backup_error(&self.endpoint, &e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
