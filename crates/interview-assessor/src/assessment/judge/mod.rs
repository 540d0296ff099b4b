//! Boundary to the external model that judges answers and drafts report prose.
//!
//! The engine never talks to a provider directly. Everything it needs from the model goes
//! through [`TurnJudge`], so the scoring path stays deterministic under a scripted judge.

mod parse;
mod replay;
mod timeout;

pub use parse::{parse_judgment, parse_text};
pub use replay::{ReplayJudge, ReplayStep};
pub use timeout::TimeoutJudge;

use super::domain::{CandidateProfile, Turn};
use super::rubric::{Dimension, Rubric};
use super::scoring::Recommendation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A quote the model pulled from the answer, with optional framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEvidence")]
pub struct EvidenceQuote {
    pub quote: String,
    pub context: String,
}

impl EvidenceQuote {
    pub fn new(quote: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            quote: quote.into(),
            context: context.into(),
        }
    }
}

/// Models emit evidence either as bare strings or as `{quote, context}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEvidence {
    Text(String),
    Item {
        quote: String,
        #[serde(default)]
        context: String,
    },
}

impl From<RawEvidence> for EvidenceQuote {
    fn from(raw: RawEvidence) -> Self {
        match raw {
            RawEvidence::Text(quote) => Self {
                quote,
                context: String::new(),
            },
            RawEvidence::Item { quote, context } => Self { quote, context },
        }
    }
}

/// Score and supporting evidence for a single dimension within one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionJudgment {
    pub score: f64,
    #[serde(default)]
    pub evidence: Vec<EvidenceQuote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl DimensionJudgment {
    pub fn new(score: f64, evidence: Vec<EvidenceQuote>) -> Self {
        Self {
            score,
            evidence,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// Structured per-turn output of the judge. Dimensions it did not assess are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    #[serde(alias = "dimension_scores")]
    pub per_dimension: BTreeMap<String, DimensionJudgment>,
    #[serde(
        default,
        alias = "overall_feedback",
        skip_serializing_if = "Option::is_none"
    )]
    pub feedback: Option<String>,
}

impl Judgment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(mut self, name: impl Into<String>, judgment: DimensionJudgment) -> Self {
        self.per_dimension.insert(name.into(), judgment);
        self
    }

    pub fn score(mut self, name: impl Into<String>, score: f64, quotes: &[&str]) -> Self {
        let evidence = quotes
            .iter()
            .map(|quote| EvidenceQuote::new(*quote, ""))
            .collect();
        self.per_dimension
            .insert(name.into(), DimensionJudgment::new(score, evidence));
        self
    }
}

/// What the report asks of the model when a dimension needs another look.
#[derive(Debug, Clone, Copy)]
pub struct FollowUpRequest<'a> {
    pub dimension: &'a Dimension,
    /// `None` when the dimension never received a sample.
    pub score: Option<f64>,
    pub reasoning: Option<&'a str>,
}

/// Inputs for the executive summary paragraph.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    pub candidate: &'a CandidateProfile,
    pub overall_score: f64,
    pub recommendation: Recommendation,
    pub questions_asked: usize,
    pub strengths: &'a [String],
    pub concerns: &'a [String],
}

/// External judge and generation collaborator.
///
/// Implementations own their timeout policy and must surface [`JudgeError::Timeout`]
/// instead of blocking indefinitely.
#[async_trait]
pub trait TurnJudge: Send + Sync {
    async fn judge(
        &self,
        rubric: &Rubric,
        transcript: &[Turn],
        question: &str,
        answer: &str,
    ) -> Result<Judgment, JudgeError>;

    async fn follow_up_question(
        &self,
        rubric: &Rubric,
        request: FollowUpRequest<'_>,
    ) -> Result<String, JudgeError>;

    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<String, JudgeError>;
}

/// Per-turn judge failure. Never aborts the interview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JudgeError {
    #[error("judge timed out")]
    Timeout,
    #[error("judge returned malformed output: {0}")]
    MalformedOutput(String),
    #[error("judge provider error: {0}")]
    ProviderError(String),
}

impl JudgeError {
    pub fn kind(&self) -> JudgeErrorKind {
        match self {
            JudgeError::Timeout => JudgeErrorKind::Timeout,
            JudgeError::MalformedOutput(_) => JudgeErrorKind::MalformedOutput,
            JudgeError::ProviderError(_) => JudgeErrorKind::ProviderError,
        }
    }
}

/// Persisted per-turn error flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeErrorKind {
    Timeout,
    MalformedOutput,
    ProviderError,
}

impl JudgeErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::MalformedOutput => "malformed output",
            Self::ProviderError => "provider error",
        }
    }
}
