use super::super::domain::{InterviewId, InterviewState};
use super::super::scoring::{ConfidenceLevel, Recommendation};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const REPORT_VERSION: &str = "1.0";

/// Five-step wording for a 1..5 score.
pub fn score_level_label(score: f64) -> &'static str {
    if score < 1.5 {
        "Poor"
    } else if score < 2.5 {
        "Fair"
    } else if score < 3.5 {
        "Good"
    } else if score < 4.5 {
        "Very Good"
    } else {
        "Excellent"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDimensionScore {
    pub dimension_name: String,
    /// `None` when the dimension received no samples.
    pub score: Option<f64>,
    pub max_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<&'static str>,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_weight: Option<f64>,
    pub sample_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStrength {
    pub dimension: String,
    pub title: String,
    pub description: String,
    pub score: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConcernSeverity {
    Minor,
    Moderate,
    Major,
}

impl ConcernSeverity {
    /// Minor (2.5, 3.0], Moderate (1.5, 2.5], Major ≤ 1.5.
    pub fn from_score(score: f64) -> Self {
        if score > 2.5 {
            Self::Minor
        } else if score > 1.5 {
            Self::Moderate
        } else {
            Self::Major
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Major => "Major",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportConcern {
    pub dimension: String,
    pub title: String,
    pub description: String,
    pub score: f64,
    pub severity: ConcernSeverity,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteHighlight {
    pub quote: String,
    pub context: String,
    pub dimension: String,
    pub turn_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpQuestion {
    pub question: String,
    pub reason: String,
    pub dimension: String,
}

/// Final, immutable evaluation of a completed interview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub interview_id: InterviewId,
    pub template_id: String,
    pub candidate_name: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    pub overall_score: f64,
    pub confidence: ConfidenceLevel,
    pub recommendation: Recommendation,
    pub coverage: f64,
    pub judged_turns: usize,
    pub failed_turns: usize,
    pub dimension_scores: Vec<ReportDimensionScore>,
    pub strengths: Vec<ReportStrength>,
    pub concerns: Vec<ReportConcern>,
    pub notable_quotes: Vec<QuoteHighlight>,
    pub follow_up_questions: Vec<FollowUpQuestion>,
    pub summary: String,
    pub full_transcript: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub report_version: &'static str,
}

/// Per-dimension progress while the interview is running.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveDimension {
    pub name: String,
    pub weight: f64,
    pub sample_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_mean: Option<f64>,
    pub evidence_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_quote: Option<String>,
}

/// Read-only progress view, available in any state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveAssessment {
    pub interview_id: InterviewId,
    pub state: InterviewState,
    pub answered_turns: usize,
    pub judged_turns: usize,
    pub failed_turns: usize,
    pub coverage: f64,
    /// Weighted score over the dimensions observed so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisional_score: Option<f64>,
    pub dimensions: Vec<LiveDimension>,
}
