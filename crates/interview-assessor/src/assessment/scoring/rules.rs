use super::super::aggregator::DimensionAggregator;
use super::super::rubric::Rubric;
use super::DimensionScore;

pub(crate) struct WeightedDimensions {
    pub dimensions: Vec<DimensionScore>,
    /// `None` when no dimension has data.
    pub overall_score: Option<f64>,
    pub coverage: f64,
}

/// Exclude-and-renormalize: unobserved dimensions drop out and their weight is spread
/// proportionally across the dimensions that have samples.
pub(crate) fn weigh(rubric: &Rubric, aggregator: &DimensionAggregator) -> WeightedDimensions {
    let observed_weight: f64 = rubric
        .dimensions()
        .iter()
        .filter(|dimension| {
            aggregator
                .state(dimension.name())
                .map(|state| state.has_data())
                .unwrap_or(false)
        })
        .map(|dimension| dimension.weight())
        .sum();

    let mut dimensions = Vec::with_capacity(rubric.dimensions().len());
    let mut weighted_sum = 0.0;
    let mut observed = 0usize;

    for dimension in rubric.dimensions() {
        let state = aggregator.state(dimension.name());
        let score = state.and_then(|state| state.running_mean());
        let sample_count = state.map(|state| state.sample_count()).unwrap_or(0);

        let effective_weight = match score {
            Some(_) if observed_weight > 0.0 => Some(dimension.weight() / observed_weight),
            _ => None,
        };

        if let (Some(score), Some(weight)) = (score, effective_weight) {
            weighted_sum += score * weight;
            observed += 1;
        }

        dimensions.push(DimensionScore {
            name: dimension.name().to_string(),
            weight: dimension.weight(),
            effective_weight,
            score,
            sample_count,
        });
    }

    let total = rubric.dimensions().len();
    let coverage = if total == 0 {
        0.0
    } else {
        observed as f64 / total as f64
    };

    WeightedDimensions {
        dimensions,
        overall_score: (observed > 0).then_some(weighted_sum),
        coverage,
    }
}
