//! RICE scoring and score classification.

use crate::error::{DiscoveryError, Result};

/// RICE score: `reach * impact * (confidence / 100) / effort`, rounded to one
/// decimal place (half away from zero).
///
/// Returns 0 when `effort` is zero, negative or NaN.
#[must_use]
pub fn score(reach: f64, impact: f64, confidence: f64, effort: f64) -> f64 {
    if effort.is_nan() || effort <= 0.0 {
        return 0.0;
    }
    round_one_decimal(reach * impact * (confidence / 100.0) / effort)
}

fn round_one_decimal(value: f64) -> f64 {
    // f64::round rounds half away from zero
    (value * 10.0).round() / 10.0
}

/// Discrete score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreLevel {
    Low,
    Medium,
    High,
}

impl ScoreLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Display color name for this band.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "grey",
            Self::Medium => "yellow",
            Self::High => "green",
        }
    }
}

impl std::fmt::Display for ScoreLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lower bounds of the medium and high bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub medium: f64,
    pub high: f64,
}

impl Thresholds {
    pub const DEFAULT: Self = Self {
        medium: 1.0,
        high: 2.0,
    };

    /// Build a threshold pair.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a bound is negative or not finite, or if
    /// `medium > high`.
    pub fn new(medium: f64, high: f64) -> Result<Self> {
        if !medium.is_finite() || !high.is_finite() || medium < 0.0 || high < 0.0 {
            return Err(DiscoveryError::Config(format!(
                "score thresholds must be finite and non-negative (medium={medium}, high={high})"
            )));
        }
        if medium > high {
            return Err(DiscoveryError::Config(format!(
                "medium threshold {medium} exceeds high threshold {high}"
            )));
        }
        Ok(Self { medium, high })
    }

    #[must_use]
    pub fn level(&self, score: f64) -> ScoreLevel {
        if score >= self.high {
            ScoreLevel::High
        } else if score >= self.medium {
            ScoreLevel::Medium
        } else {
            ScoreLevel::Low
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Classify a score against [`Thresholds::DEFAULT`].
#[must_use]
pub fn level(score: f64) -> ScoreLevel {
    Thresholds::DEFAULT.level(score)
}
