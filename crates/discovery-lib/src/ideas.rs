//! Idea collection.
//!
//! Every mutating operation returns a new `IdeaStore`; the receiver is left
//! untouched so callers can swap snapshots atomically. Operations that find
//! nothing to change return `None`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{DiscoveryError, Result};
use crate::model::{Idea, Status};
use crate::query::{IdeaDraft, IdeaPatch};

/// Ideas in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaStore {
    ideas: Vec<Idea>,
}

impl IdeaStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_ideas(ideas: Vec<Idea>) -> Self {
        Self { ideas }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    #[must_use]
    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Idea> {
        self.ideas.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Idea] {
        &self.ideas
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Idea> {
        self.ideas
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Idea> {
        self.ideas.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ideas.iter().any(|i| i.id == id)
    }

    /// Ideas belonging to a project, in insertion order.
    pub fn in_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a Idea> {
        self.ideas.iter().filter(move |i| i.project_id == project_id)
    }

    /// Ideas sharing a (project, status) pair, in insertion order.
    pub fn bucket<'a>(
        &'a self,
        project_id: &'a str,
        status: Status,
    ) -> impl Iterator<Item = &'a Idea> {
        self.ideas
            .iter()
            .filter(move |i| i.in_bucket(project_id, status))
    }

    /// Highest `order` in a bucket, if the bucket has any ideas.
    #[must_use]
    pub fn max_order(&self, project_id: &str, status: Status) -> Option<i64> {
        self.bucket(project_id, status).map(|i| i.order).max()
    }

    /// Order assigned to the next idea entering a bucket.
    #[must_use]
    pub fn next_order(&self, project_id: &str, status: Status) -> i64 {
        self.max_order(project_id, status).map_or(0, |max| max + 1)
    }

    /// Resolve a partial ID to a full ID.
    ///
    /// Tries: exact match, prefix-normalized (`abc` -> `idea-abc`), then a
    /// unique substring of the hash portion.
    ///
    /// # Errors
    ///
    /// Returns `IdeaNotFound` or `AmbiguousId`.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let ids: Vec<&str> = self.ideas.iter().map(|i| i.id.as_str()).collect();
        crate::util::resolve_partial_id(&ids, "idea", input)?.ok_or_else(|| {
            DiscoveryError::IdeaNotFound {
                id: input.trim().to_string(),
            }
        })
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Append a new idea at the end of its (project, status) bucket.
    #[must_use]
    pub fn add(&self, project_id: &str, draft: &IdeaDraft, id: String, now: DateTime<Utc>) -> Self {
        let mut idea = Idea {
            id,
            project_id: project_id.to_string(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            reach: draft.reach,
            impact: draft.impact,
            confidence: draft.confidence,
            effort: draft.effort,
            rice_score: 0.0,
            status: draft.status,
            order: self.next_order(project_id, draft.status),
            created_at: now,
            updated_at: now,
        };
        idea.recompute_score();

        let mut ideas = Vec::with_capacity(self.ideas.len() + 1);
        ideas.extend(self.ideas.iter().cloned());
        ideas.push(idea);
        Self { ideas }
    }

    /// Merge the present patch fields into an idea and recompute its score.
    #[must_use]
    pub fn update(&self, id: &str, patch: &IdeaPatch, now: DateTime<Utc>) -> Option<Self> {
        self.map_one(id, |idea| {
            if let Some(ref title) = patch.title {
                idea.title.clone_from(title);
            }
            if let Some(ref description) = patch.description {
                idea.description.clone_from(description);
            }
            if let Some(reach) = patch.reach {
                idea.reach = reach;
            }
            if let Some(impact) = patch.impact {
                idea.impact = impact;
            }
            if let Some(confidence) = patch.confidence {
                idea.confidence = confidence;
            }
            if let Some(effort) = patch.effort {
                idea.effort = effort;
            }
            if let Some(status) = patch.status {
                idea.status = status;
            }
            idea.recompute_score();
            idea.updated_at = now;
        })
    }

    /// Remove an idea. `None` when the id is unknown.
    #[must_use]
    pub fn delete(&self, id: &str) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        Some(Self {
            ideas: self.ideas.iter().filter(|i| i.id != id).cloned().collect(),
        })
    }

    /// Move an idea to another status. `new_order` is applied only when given.
    #[must_use]
    pub fn change_status(
        &self,
        id: &str,
        status: Status,
        new_order: Option<i64>,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        self.map_one(id, |idea| {
            idea.status = status;
            if let Some(order) = new_order {
                idea.order = order;
            }
            idea.updated_at = now;
        })
    }

    /// Replace the whole collection with a caller-computed list.
    #[must_use]
    pub fn reorder(ideas: Vec<Idea>) -> Self {
        Self { ideas }
    }

    /// Remove every idea of a project. `None` when the project has no ideas.
    #[must_use]
    pub fn delete_project_ideas(&self, project_id: &str) -> Option<Self> {
        if !self.ideas.iter().any(|i| i.project_id == project_id) {
            return None;
        }
        Some(Self {
            ideas: self
                .ideas
                .iter()
                .filter(|i| i.project_id != project_id)
                .cloned()
                .collect(),
        })
    }

    /// Full collection with the ideas in `sequence` renumbered `0..n-1` in
    /// the given order. Ideas not in `sequence` keep their order.
    #[must_use]
    pub fn renumbered(&self, sequence: &[&str]) -> Vec<Idea> {
        let positions: HashMap<&str, i64> = sequence
            .iter()
            .zip(0_i64..)
            .map(|(id, pos)| (*id, pos))
            .collect();

        self.ideas
            .iter()
            .map(|idea| {
                let mut idea = idea.clone();
                if let Some(&pos) = positions.get(idea.id.as_str()) {
                    idea.order = pos;
                }
                idea
            })
            .collect()
    }

    fn map_one(&self, id: &str, apply: impl FnOnce(&mut Idea)) -> Option<Self> {
        let idx = self.ideas.iter().position(|i| i.id == id)?;
        let mut ideas = self.ideas.clone();
        apply(&mut ideas[idx]);
        Some(Self { ideas })
    }
}
