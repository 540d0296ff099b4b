use crate::config::AssessmentConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const STRONG_HIRE_THRESHOLD: f64 = 4.3;
pub const HIRE_THRESHOLD: f64 = 3.5;
pub const NO_HIRE_THRESHOLD: f64 = 2.0;

pub const HIGH_COVERAGE: f64 = 0.9;
pub const MEDIUM_COVERAGE: f64 = 0.6;

/// Four-tier hiring recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongHire,
    Hire,
    NoHire,
    StrongNoHire,
}

impl Recommendation {
    /// Fixed bands with closed lower bounds: a score on a threshold takes the higher tier.
    pub fn for_score(overall_score: f64) -> Self {
        if overall_score >= STRONG_HIRE_THRESHOLD {
            Self::StrongHire
        } else if overall_score >= HIRE_THRESHOLD {
            Self::Hire
        } else if overall_score >= NO_HIRE_THRESHOLD {
            Self::NoHire
        } else {
            Self::StrongNoHire
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongHire => "Strong Hire",
            Self::Hire => "Hire",
            Self::NoHire => "No Hire",
            Self::StrongNoHire => "Strong No Hire",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse reliability label attached to every score card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn from_coverage(coverage: f64) -> Self {
        if coverage >= HIGH_COVERAGE {
            Self::High
        } else if coverage >= MEDIUM_COVERAGE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// One band lower; `Low` stays `Low`.
    pub const fn lowered(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Knobs that adjust how a score card is labelled. Thresholds themselves are fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    pub judge_failure_tolerance: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            judge_failure_tolerance: AssessmentConfig::DEFAULT_JUDGE_FAILURE_TOLERANCE,
        }
    }
}

impl From<&AssessmentConfig> for ScoringPolicy {
    fn from(config: &AssessmentConfig) -> Self {
        Self {
            judge_failure_tolerance: config.judge_failure_tolerance,
        }
    }
}

impl ScoringPolicy {
    pub(crate) fn confidence(&self, coverage: f64, answered: usize, failed: usize) -> ConfidenceLevel {
        let band = ConfidenceLevel::from_coverage(coverage);
        if answered == 0 {
            return band;
        }
        let failure_ratio = failed as f64 / answered as f64;
        if failure_ratio > self.judge_failure_tolerance {
            band.lowered()
        } else {
            band
        }
    }
}
