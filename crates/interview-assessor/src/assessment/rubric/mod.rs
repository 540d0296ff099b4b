//! Assessment rubrics: the weighted dimensions an interview is scored against.
//!
//! A [`Rubric`] can only be obtained through validation of a [`RubricDocument`], so every
//! rubric bound to an interview already satisfies the weight and level invariants. Scoring
//! code never re-checks them.

mod catalog;
mod loader;

pub use catalog::RubricCatalog;
pub use loader::{
    load_rubric_file, parse_rubric, DirectoryRubricSource, RubricFormat, RubricSource,
    SourceDocument, StaticRubricSource,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Allowed drift between the declared weight total and 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Number of score levels every dimension must describe.
pub const LEVEL_COUNT: u8 = 5;

/// One rung of a dimension's 1..5 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLevel {
    pub score: u8,
    pub label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// A named, weighted axis of evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    name: String,
    description: String,
    weight: f64,
    levels: Vec<ScoreLevel>,
    keywords: Vec<String>,
}

impl Dimension {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Levels ordered 1..=5.
    pub fn levels(&self) -> &[ScoreLevel] {
        &self.levels
    }

    pub fn level(&self, score: u8) -> Option<&ScoreLevel> {
        self.levels.iter().find(|level| level.score == score)
    }

    /// Dimension keywords followed by any level-specific keywords, without duplicates.
    pub fn keywords(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.keywords
            .iter()
            .chain(self.levels.iter().flat_map(|level| level.keywords.iter()))
            .map(String::as_str)
            .filter(|keyword| seen.insert(*keyword))
            .collect()
    }
}

/// Immutable, validated rubric shared read-only across interviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rubric {
    template_id: String,
    version: String,
    dimensions: Vec<Dimension>,
}

impl Rubric {
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.name == name)
    }

    pub fn dimension_names(&self) -> Vec<&str> {
        self.dimensions
            .iter()
            .map(|dimension| dimension.name.as_str())
            .collect()
    }

    /// Level description for `score` in `dimension`, if both exist.
    pub fn criteria_for(&self, dimension: &str, score: u8) -> Option<&str> {
        self.dimension(dimension)
            .and_then(|dimension| dimension.level(score))
            .map(|level| level.description.as_str())
    }
}

impl TryFrom<RubricDocument> for Rubric {
    type Error = RubricError;

    fn try_from(document: RubricDocument) -> Result<Self, Self::Error> {
        validate(document)
    }
}

/// Declarative, unvalidated rubric as authored in a template file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RubricDocument {
    #[serde(default, alias = "template_name")]
    pub template_id: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionDocument>,
}

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionDocument {
    #[serde(alias = "dimension_name")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub weight: f64,
    #[serde(alias = "score_levels")]
    pub levels: Vec<ScoreLevel>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn validate(document: RubricDocument) -> Result<Rubric, RubricError> {
    let RubricDocument {
        template_id,
        version,
        dimensions,
    } = document;

    let template_id = template_id.trim().to_string();
    if template_id.is_empty() {
        return Err(RubricError::MissingTemplateId);
    }
    if dimensions.is_empty() {
        return Err(RubricError::NoDimensions);
    }

    let mut names = HashSet::new();
    let mut validated = Vec::with_capacity(dimensions.len());
    for dimension in dimensions {
        let name = dimension.name.trim().to_string();
        if name.is_empty() {
            return Err(RubricError::UnnamedDimension);
        }
        if !names.insert(name.clone()) {
            return Err(RubricError::DuplicateDimension(name));
        }
        if !dimension.weight.is_finite() || dimension.weight <= 0.0 || dimension.weight > 1.0 {
            return Err(RubricError::InvalidWeight {
                dimension: name,
                weight: dimension.weight,
            });
        }

        let levels = validate_levels(&name, dimension.levels)?;
        validated.push(Dimension {
            name,
            description: dimension.description,
            weight: dimension.weight,
            levels,
            keywords: dimension.keywords,
        });
    }

    let total: f64 = validated.iter().map(|dimension| dimension.weight).sum();
    if (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(RubricError::WeightSum { total });
    }

    Ok(Rubric {
        template_id,
        version,
        dimensions: validated,
    })
}

fn validate_levels(
    dimension: &str,
    mut levels: Vec<ScoreLevel>,
) -> Result<Vec<ScoreLevel>, RubricError> {
    if levels.len() != LEVEL_COUNT as usize {
        return Err(RubricError::InvalidLevels {
            dimension: dimension.to_string(),
            detail: format!("found {} level(s)", levels.len()),
        });
    }

    levels.sort_by_key(|level| level.score);
    for (expected, level) in (1..=LEVEL_COUNT).zip(&levels) {
        if level.score != expected {
            return Err(RubricError::InvalidLevels {
                dimension: dimension.to_string(),
                detail: format!("expected level {expected}, found {}", level.score),
            });
        }
    }

    Ok(levels)
}

/// Load-time rubric failure. Blocks interview creation for the template.
#[derive(Debug, thiserror::Error)]
pub enum RubricError {
    #[error("rubric template '{0}' not found")]
    NotFound(String),
    #[error("failed to read rubric {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid rubric document: {0}")]
    Parse(String),
    #[error("rubric template id must not be empty")]
    MissingTemplateId,
    #[error("rubric must define at least one dimension")]
    NoDimensions,
    #[error("dimension name must not be empty")]
    UnnamedDimension,
    #[error("dimension '{0}' is defined more than once")]
    DuplicateDimension(String),
    #[error("dimension '{dimension}' has weight {weight}; weights must be in (0, 1]")]
    InvalidWeight { dimension: String, weight: f64 },
    #[error("dimension '{dimension}' must define exactly five score levels numbered 1..5 ({detail})")]
    InvalidLevels { dimension: String, detail: String },
    #[error("dimension weights sum to {total}, expected 1.0")]
    WeightSum { total: f64 },
}
