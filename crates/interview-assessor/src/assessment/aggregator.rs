use super::domain::Turn;
use super::judge::{EvidenceQuote, Judgment};
use super::rubric::Rubric;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// Evidence stamped with where and how it was collected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedEvidence {
    pub quote: String,
    pub context: String,
    pub turn_index: usize,
    /// Score the judge gave the dimension in the turn this quote came from.
    pub score_impact: f64,
}

/// Running statistics for one dimension of one interview.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DimensionState {
    samples: Vec<f64>,
    evidence: Vec<CollectedEvidence>,
    running_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_reasoning: Option<String>,
    #[serde(skip)]
    total: f64,
}

impl DimensionState {
    fn observe(
        &mut self,
        score: f64,
        evidence: &[EvidenceQuote],
        turn_index: usize,
        reasoning: Option<&str>,
    ) {
        self.samples.push(score);
        self.total += score;
        self.running_mean = Some(self.total / self.samples.len() as f64);
        self.evidence
            .extend(evidence.iter().map(|item| CollectedEvidence {
                quote: item.quote.clone(),
                context: item.context.clone(),
                turn_index,
                score_impact: score,
            }));
        if let Some(reasoning) = reasoning.filter(|text| !text.trim().is_empty()) {
            self.latest_reasoning = Some(reasoning.to_string());
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Evidence in collection order.
    pub fn evidence(&self) -> &[CollectedEvidence] {
        &self.evidence
    }

    /// Arithmetic mean of the samples; `None` when the dimension was never observed.
    pub fn running_mean(&self) -> Option<f64> {
        self.running_mean
    }

    pub fn latest_reasoning(&self) -> Option<&str> {
        self.latest_reasoning.as_deref()
    }

    pub fn has_data(&self) -> bool {
        !self.samples.is_empty()
    }
}

/// Rejected `observe` input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    #[error("dimension '{0}' is not part of the rubric")]
    UnknownDimension(String),
    #[error("score {score} for dimension '{dimension}' is outside 1..=5")]
    ScoreOutOfRange { dimension: String, score: f64 },
}

/// Outcome of folding one judgment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldSummary {
    pub observed: Vec<String>,
    pub warnings: Vec<String>,
}

/// Folds per-turn judgments into per-dimension state, in rubric order.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionAggregator {
    dimensions: Vec<(String, DimensionState)>,
}

impl DimensionAggregator {
    pub fn new(rubric: &Rubric) -> Self {
        Self {
            dimensions: rubric
                .dimensions()
                .iter()
                .map(|dimension| (dimension.name().to_string(), DimensionState::default()))
                .collect(),
        }
    }

    /// Re-folds a turn sequence from scratch. Equal to the incremental fold of the same turns.
    pub fn rebuild(rubric: &Rubric, turns: &[Turn]) -> Self {
        let mut aggregator = Self::new(rubric);
        for turn in turns {
            if let Some(judgment) = &turn.judgment {
                aggregator.apply(turn.index, judgment);
            }
        }
        aggregator
    }

    pub fn observe(
        &mut self,
        dimension: &str,
        score: f64,
        evidence: &[EvidenceQuote],
        turn_index: usize,
    ) -> Result<(), AggregationError> {
        self.observe_with_reasoning(dimension, score, evidence, turn_index, None)
    }

    fn observe_with_reasoning(
        &mut self,
        dimension: &str,
        score: f64,
        evidence: &[EvidenceQuote],
        turn_index: usize,
        reasoning: Option<&str>,
    ) -> Result<(), AggregationError> {
        if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(AggregationError::ScoreOutOfRange {
                dimension: dimension.to_string(),
                score,
            });
        }

        let state = self
            .dimensions
            .iter_mut()
            .find(|(name, _)| name == dimension)
            .map(|(_, state)| state)
            .ok_or_else(|| AggregationError::UnknownDimension(dimension.to_string()))?;

        state.observe(score, evidence, turn_index, reasoning);
        debug!(
            dimension,
            score,
            samples = state.sample_count(),
            "observed dimension score"
        );
        Ok(())
    }

    /// Applies every valid entry of a judgment. Invalid entries become warnings, never errors.
    pub fn apply(&mut self, turn_index: usize, judgment: &Judgment) -> FoldSummary {
        let mut summary = FoldSummary::default();

        for (dimension, entry) in &judgment.per_dimension {
            match self.observe_with_reasoning(
                dimension,
                entry.score,
                &entry.evidence,
                turn_index,
                entry.reasoning.as_deref(),
            ) {
                Ok(()) => summary.observed.push(dimension.clone()),
                Err(err) => {
                    warn!(turn_index, error = %err, "dropping judgment entry");
                    summary
                        .warnings
                        .push(format!("turn {}: {}", turn_index + 1, err));
                }
            }
        }

        summary
    }

    pub fn state(&self, dimension: &str) -> Option<&DimensionState> {
        self.dimensions
            .iter()
            .find(|(name, _)| name == dimension)
            .map(|(_, state)| state)
    }

    /// Dimensions in rubric order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DimensionState)> {
        self.dimensions
            .iter()
            .map(|(name, state)| (name.as_str(), state))
    }

    /// Read-only copy keyed by dimension name.
    pub fn snapshot(&self) -> BTreeMap<String, DimensionState> {
        self.dimensions.iter().cloned().collect()
    }

    pub fn total_samples(&self) -> usize {
        self.dimensions
            .iter()
            .map(|(_, state)| state.sample_count())
            .sum()
    }

    pub fn observed_dimensions(&self) -> usize {
        self.dimensions
            .iter()
            .filter(|(_, state)| state.has_data())
            .count()
    }
}
