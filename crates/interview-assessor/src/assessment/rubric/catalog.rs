use super::loader::parse_document;
use super::{Rubric, RubricError, RubricSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{info, warn};

/// Process-wide, read-through rubric cache keyed by template id.
///
/// Entries are parsed once on first request and never evicted. Reads only take the shared
/// lock; first loads are serialized so a template is never parsed twice.
pub struct RubricCatalog {
    source: Box<dyn RubricSource>,
    rubrics: RwLock<HashMap<String, Arc<Rubric>>>,
    load_lock: Mutex<()>,
}

impl RubricCatalog {
    pub fn new<S>(source: S) -> Self
    where
        S: RubricSource + 'static,
    {
        Self {
            source: Box::new(source),
            rubrics: RwLock::new(HashMap::new()),
            load_lock: Mutex::new(()),
        }
    }

    pub fn load(&self, template_id: &str) -> Result<Arc<Rubric>, RubricError> {
        if let Some(rubric) = self.cached(template_id) {
            return Ok(rubric);
        }

        let _loading = self
            .load_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished the load while we waited.
        if let Some(rubric) = self.cached(template_id) {
            return Ok(rubric);
        }

        let document = self.source.fetch(template_id)?;
        let mut parsed = parse_document(&document.text, document.format)?;
        // Interviews record the id they were created with, so it must load the same rubric
        // again after a restart.
        let declared = parsed.template_id.trim();
        if !declared.is_empty() && declared != template_id {
            warn!(
                requested = template_id,
                declared,
                "rubric declares a different template id; using the requested id"
            );
        }
        parsed.template_id = template_id.to_string();

        let rubric = Arc::new(Rubric::try_from(parsed)?);
        info!(
            template_id,
            origin = %document.origin,
            dimensions = rubric.dimensions().len(),
            "loaded assessment rubric"
        );

        self.rubrics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(template_id.to_string(), Arc::clone(&rubric));
        Ok(rubric)
    }

    pub fn cached(&self, template_id: &str) -> Option<Arc<Rubric>> {
        self.rubrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(template_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rubrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RubricCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RubricCatalog")
            .field("cached", &self.len())
            .finish()
    }
}
