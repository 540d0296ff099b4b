mod policy;
mod rules;

pub use policy::{
    ConfidenceLevel, Recommendation, ScoringPolicy, HIGH_COVERAGE, HIRE_THRESHOLD,
    MEDIUM_COVERAGE, NO_HIRE_THRESHOLD, STRONG_HIRE_THRESHOLD,
};

pub(crate) use rules::weigh;

use super::aggregator::{DimensionAggregator, MAX_SCORE};
use super::rubric::Rubric;
use serde::Serialize;

/// Per-dimension contribution to the overall score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub name: String,
    pub weight: f64,
    /// Rubric weight re-normalized over observed dimensions; `None` if unobserved.
    pub effective_weight: Option<f64>,
    /// Mean of the dimension's samples; `None` if unobserved.
    pub score: Option<f64>,
    pub sample_count: usize,
}

/// Result of scoring a finished aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub overall_score: f64,
    pub coverage: f64,
    pub confidence: ConfidenceLevel,
    pub recommendation: Recommendation,
    pub dimensions: Vec<DimensionScore>,
}

/// Counts of answered turns, used to account for judge failures in confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnTally {
    pub answered: usize,
    pub failed: usize,
}

/// Stateless scorer applying the fixed recommendation bands to aggregated data.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    policy: ScoringPolicy,
}

impl ScoringEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Scores the aggregation. A rubric with no observed dimension scores 0.0.
    pub fn score(
        &self,
        rubric: &Rubric,
        aggregator: &DimensionAggregator,
        tally: TurnTally,
    ) -> ScoreCard {
        let weighted = weigh(rubric, aggregator);
        // Weight sums carry float drift; keep the result inside the scale.
        let overall_score = weighted.overall_score.unwrap_or(0.0).clamp(0.0, MAX_SCORE);

        ScoreCard {
            overall_score,
            coverage: weighted.coverage,
            confidence: self
                .policy
                .confidence(weighted.coverage, tally.answered, tally.failed),
            recommendation: Recommendation::for_score(overall_score),
            dimensions: weighted.dimensions,
        }
    }
}
