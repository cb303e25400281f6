//! Input and sort types for board operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DiscoveryError;
use crate::model::{Impact, Status};

/// Fields for a new idea. The title is expected to be validated already.
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaDraft {
    pub title: String,
    pub description: String,
    pub reach: f64,
    pub impact: Impact,
    pub confidence: f64,
    pub effort: f64,
    pub status: Status,
}

impl Default for IdeaDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            reach: 5.0,
            impact: Impact::Medium,
            confidence: 80.0,
            effort: 4.0,
            status: Status::Open,
        }
    }
}

/// Fields to update on an idea. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reach: Option<f64>,
    pub impact: Option<Impact>,
    pub confidence: Option<f64>,
    pub effort: Option<f64>,
    /// Direct status change from the edit form; `order` is left as is.
    pub status: Option<Status>,
}

impl IdeaPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.reach.is_none()
            && self.impact.is_none()
            && self.confidence.is_none()
            && self.effort.is_none()
            && self.status.is_none()
    }
}

/// Fields for a new project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

/// Fields to update on a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Table column used for auto-mode sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Title,
    Reach,
    Impact,
    Confidence,
    Effort,
    #[default]
    RiceScore,
    Status,
}

impl SortColumn {
    pub const ALL: [Self; 7] = [
        Self::Title,
        Self::Reach,
        Self::Impact,
        Self::Confidence,
        Self::Effort,
        Self::RiceScore,
        Self::Status,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Reach => "reach",
            Self::Impact => "impact",
            Self::Confidence => "confidence",
            Self::Effort => "effort",
            Self::RiceScore => "riceScore",
            Self::Status => "status",
        }
    }

    /// Text columns compare lexicographically, the rest numerically.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Title | Self::Status)
    }

    /// Direction used when a column is first selected.
    #[must_use]
    pub const fn initial_direction(self) -> SortDirection {
        if self.is_text() {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "reach" => Ok(Self::Reach),
            "impact" => Ok(Self::Impact),
            "confidence" => Ok(Self::Confidence),
            "effort" => Ok(Self::Effort),
            "ricescore" | "rice_score" | "rice" | "score" => Ok(Self::RiceScore),
            "status" => Ok(Self::Status),
            other => Err(DiscoveryError::InvalidSortColumn {
                column: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Selected table column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl TableSort {
    #[must_use]
    pub const fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Header-click semantics: same column flips, a new column starts at its
    /// initial direction.
    #[must_use]
    pub fn toggled(self, column: SortColumn) -> Self {
        if self.column == column {
            Self::new(column, self.direction.flipped())
        } else {
            Self::new(column, column.initial_direction())
        }
    }
}
