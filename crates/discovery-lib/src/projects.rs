//! Project collection.
//!
//! Like [`IdeaStore`](crate::IdeaStore), transitions return a fresh snapshot
//! and `None` when nothing changed. Cascading deletes are handled by the
//! board reducer, which owns both collections.

use chrono::{DateTime, Utc};

use crate::error::{DiscoveryError, Result};
use crate::model::Project;
use crate::query::{ProjectDraft, ProjectPatch};

/// Projects in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStore {
    projects: Vec<Project>,
}

impl ProjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Project> {
        self.projects
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    /// First project whose name matches exactly.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Resolve a partial project ID (`k3f`, `proj-k3f9a`).
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` or `AmbiguousId`.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let ids: Vec<&str> = self.projects.iter().map(|p| p.id.as_str()).collect();
        crate::util::resolve_partial_id(&ids, "proj", input)?.ok_or_else(|| {
            DiscoveryError::ProjectNotFound {
                id: input.trim().to_string(),
            }
        })
    }

    #[must_use]
    pub fn add(&self, draft: &ProjectDraft, id: String, now: DateTime<Utc>) -> Self {
        let mut projects = self.projects.clone();
        projects.push(Project {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            created_at: now,
        });
        Self { projects }
    }

    /// Apply the present patch fields. `None` when the id is unknown.
    #[must_use]
    pub fn update(&self, id: &str, patch: &ProjectPatch) -> Option<Self> {
        let idx = self.projects.iter().position(|p| p.id == id)?;
        let mut projects = self.projects.clone();
        let project = &mut projects[idx];
        if let Some(ref name) = patch.name {
            project.name.clone_from(name);
        }
        if let Some(ref description) = patch.description {
            project.description.clone_from(description);
        }
        Some(Self { projects })
    }

    #[must_use]
    pub fn delete(&self, id: &str) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        Some(Self {
            projects: self
                .projects
                .iter()
                .filter(|p| p.id != id)
                .cloned()
                .collect(),
        })
    }
}
