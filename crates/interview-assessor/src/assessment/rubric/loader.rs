use super::{Rubric, RubricDocument, RubricError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Serialization of a rubric template on disk or in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubricFormat {
    Yaml,
    Json,
}

impl RubricFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Raw template text plus enough context to parse and report on it.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub text: String,
    pub format: RubricFormat,
    pub origin: String,
}

/// Where rubric templates come from, keyed by template id.
pub trait RubricSource: Send + Sync {
    fn fetch(&self, template_id: &str) -> Result<SourceDocument, RubricError>;
}

/// Parses and validates a rubric document.
pub fn parse_rubric(text: &str, format: RubricFormat) -> Result<Rubric, RubricError> {
    Rubric::try_from(parse_document(text, format)?)
}

pub(super) fn parse_document(
    text: &str,
    format: RubricFormat,
) -> Result<RubricDocument, RubricError> {
    match format {
        RubricFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|err| RubricError::Parse(err.to_string()))
        }
        RubricFormat::Json => {
            serde_json::from_str(text).map_err(|err| RubricError::Parse(err.to_string()))
        }
    }
}

/// Reads a rubric straight from a file, bypassing any cache.
pub fn load_rubric_file(path: &Path) -> Result<Rubric, RubricError> {
    let text = std::fs::read_to_string(path).map_err(|source| RubricError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rubric(&text, RubricFormat::from_path(path))
}

/// Resolves `<dir>/<template_id>-assessment.{yaml,yml,json}` across ordered search paths.
#[derive(Debug, Clone)]
pub struct DirectoryRubricSource {
    dirs: Vec<PathBuf>,
}

impl DirectoryRubricSource {
    const SUFFIXES: [&'static str; 3] = ["-assessment.yaml", "-assessment.yml", "-assessment.json"];

    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    fn candidates(&self, template_id: &str) -> impl Iterator<Item = PathBuf> + '_ {
        let template_id = template_id.to_string();
        self.dirs.iter().flat_map(move |dir| {
            Self::SUFFIXES
                .iter()
                .map(|suffix| dir.join(format!("{template_id}{suffix}")))
                .collect::<Vec<_>>()
        })
    }
}

impl RubricSource for DirectoryRubricSource {
    fn fetch(&self, template_id: &str) -> Result<SourceDocument, RubricError> {
        // Template ids become file names; refuse anything that could walk the tree.
        if template_id.is_empty()
            || template_id.contains(['/', '\\'])
            || template_id.contains("..")
        {
            return Err(RubricError::NotFound(template_id.to_string()));
        }

        for path in self.candidates(template_id) {
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), template_id, "reading rubric template");
            let text = std::fs::read_to_string(&path).map_err(|source| RubricError::Io {
                path: path.clone(),
                source,
            })?;
            return Ok(SourceDocument {
                text,
                format: RubricFormat::from_path(&path),
                origin: path.display().to_string(),
            });
        }

        warn!(template_id, "no rubric template found on search path");
        Err(RubricError::NotFound(template_id.to_string()))
    }
}

/// In-memory documents, for embedded templates and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRubricSource {
    documents: HashMap<String, (String, RubricFormat)>,
}

impl StaticRubricSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(
        mut self,
        template_id: impl Into<String>,
        text: impl Into<String>,
        format: RubricFormat,
    ) -> Self {
        self.documents
            .insert(template_id.into(), (text.into(), format));
        self
    }
}

impl RubricSource for StaticRubricSource {
    fn fetch(&self, template_id: &str) -> Result<SourceDocument, RubricError> {
        self.documents
            .get(template_id)
            .map(|(text, format)| SourceDocument {
                text: text.clone(),
                format: *format,
                origin: format!("static:{template_id}"),
            })
            .ok_or_else(|| RubricError::NotFound(template_id.to_string()))
    }
}
