//! Core data types for discovery-lib.
//!
//! Field names serialize in camelCase, matching the buckets written by the
//! browser version of the board, so existing data loads unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DiscoveryError;
use crate::query::TableSort;

/// Idea workflow status. Declaration order is kanban column order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    Todo,
    InProgress,
    Paused,
    Testing,
    Done,
}

impl Status {
    /// All statuses in column order.
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::Todo,
        Self::InProgress,
        Self::Paused,
        Self::Testing,
        Self::Done,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Testing => "testing",
            Self::Done => "done",
        }
    }

    /// Human-readable column title.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Todo => "To-do",
            Self::InProgress => "In Progress",
            Self::Paused => "Paused",
            Self::Testing => "Testing",
            Self::Done => "Done",
        }
    }

    /// Zero-based kanban column position.
    #[must_use]
    pub const fn column(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "todo" | "to-do" | "to_do" => Ok(Self::Todo),
            "in_progress" | "in-progress" | "inprogress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "testing" => Ok(Self::Testing),
            "done" => Ok(Self::Done),
            other => Err(DiscoveryError::InvalidStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// RICE impact multiplier. Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Impact {
    Minimal,
    Low,
    #[default]
    Medium,
    High,
    Massive,
}

impl Impact {
    pub const ALL: [Self; 5] = [
        Self::Minimal,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::Massive,
    ];

    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Minimal => 0.25,
            Self::Low => 0.5,
            Self::Medium => 1.0,
            Self::High => 2.0,
            Self::Massive => 3.0,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Massive => "Massive",
        }
    }

    /// Map a multiplier back to its variant. Only the five exact values match.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn from_multiplier(value: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.multiplier() == value)
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

impl FromStr for Impact {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let by_name = match normalized.as_str() {
            "minimal" => Some(Self::Minimal),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "massive" => Some(Self::Massive),
            _ => None,
        };
        by_name
            .or_else(|| {
                normalized
                    .trim_end_matches('x')
                    .parse::<f64>()
                    .ok()
                    .and_then(Self::from_multiplier)
            })
            .ok_or(DiscoveryError::InvalidImpact {
                value: s.to_string(),
            })
    }
}

impl Serialize for Impact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.multiplier())
    }
}

impl<'de> Deserialize<'de> for Impact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_multiplier(value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid impact {value}, expected one of 0.25, 0.5, 1, 2, 3"
            ))
        })
    }
}

/// Board-level view selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Table,
    Kanban,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Kanban => "kanban",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "kanban" | "board" => Ok(Self::Kanban),
            other => Err(DiscoveryError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Whether ordering is derived from the RICE score or set by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Auto,
    Manual,
}

impl SortMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }

    #[must_use]
    pub const fn is_manual(self) -> bool {
        matches!(self, Self::Manual)
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "rice" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            other => Err(DiscoveryError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// A named group of ideas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique ID (e.g., "proj-k3f9a").
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub created_at: DateTime<Utc>,
}

/// A scored idea.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Unique ID (e.g., "idea-7qz0c").
    pub id: String,

    /// Owning project. Empty only in data that predates projects; repaired on load.
    #[serde(default)]
    pub project_id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// How many people this reaches, 1-10.
    pub reach: f64,

    pub impact: Impact,

    /// Confidence percentage, 0-100.
    pub confidence: f64,

    /// Effort in hours.
    pub effort: f64,

    /// Derived from reach/impact/confidence/effort; see [`Idea::recompute_score`].
    #[serde(default)]
    pub rice_score: f64,

    #[serde(default)]
    pub status: Status,

    /// Manual position within the (project, status) bucket.
    #[serde(default)]
    pub order: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Idea {
    /// Recalculate `rice_score` from the current inputs.
    pub fn recompute_score(&mut self) {
        self.rice_score = crate::rice::score(
            self.reach,
            self.impact.multiplier(),
            self.confidence,
            self.effort,
        );
    }

    /// True when the idea has no owning project.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.project_id.trim().is_empty()
    }

    /// True when the idea belongs to the given (project, status) bucket.
    #[must_use]
    pub fn in_bucket(&self, project_id: &str, status: Status) -> bool {
        self.project_id == project_id && self.status == status
    }
}

/// Persisted view preferences and project selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Prefs {
    #[serde(default)]
    pub view_mode: ViewMode,

    #[serde(default)]
    pub sort_mode: SortMode,

    #[serde(default)]
    pub active_project_id: Option<String>,

    #[serde(default)]
    pub table_sort: TableSort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_order_matches_columns() {
        let mut shuffled = vec![Status::Done, Status::Open, Status::Testing, Status::Todo];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Status::Open, Status::Todo, Status::Testing, Status::Done]
        );
        for (idx, status) in Status::ALL.iter().enumerate() {
            assert_eq!(status.column(), idx);
        }
    }

    #[test]
    fn test_status_parse_aliases() {
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("To-Do".parse::<Status>().unwrap(), Status::Todo);
        assert!("blocked".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_impact_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Impact::Minimal).unwrap(), "0.25");
        let parsed: Impact = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Impact::High);
        assert!(serde_json::from_str::<Impact>("1.5").is_err());
    }

    #[test]
    fn test_impact_parse_name_or_number() {
        assert_eq!("massive".parse::<Impact>().unwrap(), Impact::Massive);
        assert_eq!("0.5".parse::<Impact>().unwrap(), Impact::Low);
        assert_eq!("2x".parse::<Impact>().unwrap(), Impact::High);
        assert!("4".parse::<Impact>().is_err());
    }

    #[test]
    fn test_idea_accepts_browser_format() {
        let json = r#"{
            "id": "abc",
            "title": "Legacy",
            "description": "",
            "reach": 5,
            "impact": 1,
            "confidence": 80,
            "effort": 4,
            "riceScore": 1,
            "status": "todo",
            "order": 3,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-01T10:00:00.000Z"
        }"#;
        let idea: Idea = serde_json::from_str(json).unwrap();
        assert!(idea.is_orphan());
        assert_eq!(idea.status, Status::Todo);
        assert_eq!(idea.impact, Impact::Medium);
        assert_eq!(idea.order, 3);
    }

    #[test]
    fn test_prefs_defaults_fill_missing_fields() {
        let prefs: Prefs =
            serde_json::from_str(r#"{"viewMode":"kanban","sortMode":"manual","activeProjectId":null}"#)
                .unwrap();
        assert_eq!(prefs.view_mode, ViewMode::Kanban);
        assert_eq!(prefs.sort_mode, SortMode::Manual);
        assert_eq!(prefs.table_sort, TableSort::default());
    }
}
