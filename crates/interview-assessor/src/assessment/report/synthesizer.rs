use super::super::aggregator::{CollectedEvidence, DimensionAggregator};
use super::super::scoring::{DimensionScore, ScoreCard};
use super::views::{ConcernSeverity, QuoteHighlight, ReportConcern, ReportStrength};
use std::cmp::Ordering;

pub(crate) const STRENGTH_THRESHOLD: f64 = 4.0;
pub(crate) const CONCERN_THRESHOLD: f64 = 3.0;
pub(crate) const FOLLOW_UP_THRESHOLD: f64 = 3.5;
pub(crate) const MAX_HIGHLIGHTS: usize = 3;
pub(crate) const QUOTES_PER_HIGHLIGHT: usize = 2;

fn scored(scorecard: &ScoreCard) -> impl Iterator<Item = (&DimensionScore, f64)> {
    scorecard
        .dimensions
        .iter()
        .filter_map(|dimension| dimension.score.map(|score| (dimension, score)))
}

fn earliest_quotes(aggregator: &DimensionAggregator, dimension: &str) -> Vec<String> {
    aggregator
        .state(dimension)
        .map(|state| {
            state
                .evidence()
                .iter()
                .filter(|item| !item.quote.trim().is_empty())
                .take(QUOTES_PER_HIGHLIGHT)
                .map(|item| item.quote.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn description(aggregator: &DimensionAggregator, dimension: &str, score: f64) -> String {
    aggregator
        .state(dimension)
        .and_then(|state| state.latest_reasoning())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Scored {score:.1}/5.0 in {dimension}"))
}

/// Dimensions at or above 4.0, best first. Ties keep rubric order.
pub(crate) fn strengths(
    scorecard: &ScoreCard,
    aggregator: &DimensionAggregator,
) -> Vec<ReportStrength> {
    let mut high: Vec<_> = scored(scorecard)
        .filter(|(_, score)| *score >= STRENGTH_THRESHOLD)
        .collect();
    high.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    high.into_iter()
        .take(MAX_HIGHLIGHTS)
        .map(|(dimension, score)| ReportStrength {
            dimension: dimension.name.clone(),
            title: format!("Strong {}", dimension.name),
            description: description(aggregator, &dimension.name, score),
            score,
            evidence: earliest_quotes(aggregator, &dimension.name),
        })
        .collect()
}

/// Dimensions at or below 3.0, weakest first. Ties keep rubric order.
pub(crate) fn concerns(
    scorecard: &ScoreCard,
    aggregator: &DimensionAggregator,
) -> Vec<ReportConcern> {
    let mut low: Vec<_> = scored(scorecard)
        .filter(|(_, score)| *score <= CONCERN_THRESHOLD)
        .collect();
    low.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    low.into_iter()
        .take(MAX_HIGHLIGHTS)
        .map(|(dimension, score)| ReportConcern {
            dimension: dimension.name.clone(),
            title: format!("Improvement Needed in {}", dimension.name),
            description: description(aggregator, &dimension.name, score),
            score,
            severity: ConcernSeverity::from_score(score),
            evidence: earliest_quotes(aggregator, &dimension.name),
        })
        .collect()
}

/// One quote per dimension: the longest, earliest turn on ties. Highest-scoring dimension first.
pub(crate) fn notable_quotes(
    scorecard: &ScoreCard,
    aggregator: &DimensionAggregator,
) -> Vec<QuoteHighlight> {
    let mut ranked: Vec<_> = scored(scorecard).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .filter_map(|(dimension, _)| {
            let state = aggregator.state(&dimension.name)?;
            let best = longest_quote(state.evidence())?;
            Some(QuoteHighlight {
                quote: best.quote.clone(),
                context: best.context.clone(),
                dimension: dimension.name.clone(),
                turn_index: best.turn_index,
            })
        })
        .collect()
}

fn longest_quote(evidence: &[CollectedEvidence]) -> Option<&CollectedEvidence> {
    let mut best: Option<&CollectedEvidence> = None;
    for item in evidence {
        let length = item.quote.trim().chars().count();
        if length == 0 {
            continue;
        }
        best = match best {
            None => Some(item),
            Some(current) => {
                let current_length = current.quote.trim().chars().count();
                if length > current_length
                    || (length == current_length && item.turn_index < current.turn_index)
                {
                    Some(item)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}

/// Dimensions worth probing next round: weak or never assessed. Rubric order.
pub(crate) fn follow_up_targets(scorecard: &ScoreCard) -> Vec<&DimensionScore> {
    scorecard
        .dimensions
        .iter()
        .filter(|dimension| match dimension.score {
            Some(score) => score <= FOLLOW_UP_THRESHOLD,
            None => true,
        })
        .collect()
}
