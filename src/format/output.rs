use discovery_lib::{Idea, KanbanBoard, Outcome, Project, Status, Thresholds};
use serde::{Deserialize, Serialize};

/// Idea with its score band for table and show views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaRow {
    #[serde(flatten)]
    pub idea: Idea,
    pub level: String,
}

impl IdeaRow {
    #[must_use]
    pub fn new(idea: &Idea, thresholds: &Thresholds) -> Self {
        Self {
            idea: idea.clone(),
            level: thresholds.level(idea.rice_score).as_str().to_string(),
        }
    }

    #[must_use]
    pub fn rows(ideas: &[&Idea], thresholds: &Thresholds) -> Vec<Self> {
        ideas
            .iter()
            .map(|idea| Self::new(idea, thresholds))
            .collect()
    }
}

/// One kanban column, in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumnOutput {
    pub status: Status,
    pub label: String,
    pub ideas: Vec<IdeaRow>,
}

impl KanbanColumnOutput {
    #[must_use]
    pub fn columns(board: &KanbanBoard<'_>, thresholds: &Thresholds) -> Vec<Self> {
        board
            .iter()
            .map(|(status, ideas)| Self {
                status,
                label: status.label().to_string(),
                ideas: IdeaRow::rows(ideas, thresholds),
            })
            .collect()
    }
}

/// Project with the number of ideas it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithCount {
    #[serde(flatten)]
    pub project: Project,
    pub idea_count: usize,
    pub active: bool,
}

/// Result of a single mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOutput {
    pub command: String,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Buckets written, by storage key.
    pub buckets: Vec<String>,
}

impl ChangeOutput {
    #[must_use]
    pub fn new(command: &str, outcome: &Outcome) -> Self {
        Self {
            command: command.to_string(),
            changed: !outcome.is_noop(),
            created: outcome.created.clone(),
            buckets: outcome
                .changes
                .buckets()
                .map(|bucket| bucket.key().to_string())
                .collect(),
        }
    }
}

/// Result of a drag gesture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragOutput {
    pub id: String,
    pub surface: String,
    pub target: String,
    pub started: bool,
    pub hover_changed: bool,
    pub drop_changed: bool,
    /// The dragged idea after the gesture.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea: Option<Idea>,
}
