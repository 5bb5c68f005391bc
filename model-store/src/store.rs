//! Startup-time loading of every model the cascade needs.

use crate::error::{ModelStoreError, Result};
use crate::model::{ModelLoader, ScoreModel};
use common::{NormalizationScheme, SpeciesId, TensorSpec, GENERIC_CLASS_COUNT};
use petid_species_registry::SpeciesRegistry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Input contract of the generic MobileNetV2 species classifier.
pub fn species_detector_spec() -> TensorSpec {
    TensorSpec::mobilenet(NormalizationScheme::CenteredUnit)
}

/// Loaded model handles, owned by the service and shared read-only.
#[derive(Clone)]
pub struct ModelStore {
    species_detector: Arc<dyn ScoreModel>,
    breed_models: HashMap<SpeciesId, Arc<dyn ScoreModel>>,
    load_failures: HashMap<SpeciesId, String>,
}

impl ModelStore {
    pub fn new(species_detector: Arc<dyn ScoreModel>) -> Self {
        Self {
            species_detector,
            breed_models: HashMap::new(),
            load_failures: HashMap::new(),
        }
    }

    /// Attach a breed model. Only used while assembling the store, before it is shared.
    pub fn with_breed_model(mut self, species: SpeciesId, model: Arc<dyn ScoreModel>) -> Self {
        self.load_failures.remove(&species);
        self.breed_models.insert(species, model);
        self
    }

    /// Record that a species' breed model could not be loaded.
    pub fn with_load_failure(mut self, species: SpeciesId, reason: impl Into<String>) -> Self {
        self.breed_models.remove(&species);
        self.load_failures.insert(species, reason.into());
        self
    }

    /// Load the generic classifier and every trained species' breed model.
    ///
    /// The generic classifier is required: failing to load it is an error. A breed model
    /// that fails to load only marks that species unavailable.
    pub fn load(
        registry: &SpeciesRegistry,
        species_detector_path: &Path,
        loader: &dyn ModelLoader,
    ) -> Result<Self> {
        log::info!("Loading species detector from {:?}", species_detector_path);
        let detector = loader.load(species_detector_path, species_detector_spec(), Some(GENERIC_CLASS_COUNT))?;
        let mut store = Self::new(detector);

        for config in registry.iter().filter(|c| c.status.expects_model()) {
            let outcome = registry
                .model_path(config.species)
                .ok_or_else(|| ModelStoreError::NotConfigured(config.species.to_string()))
                .and_then(|path| loader.load(&path, config.input_spec, Some(config.breed_count())));

            store = match outcome {
                Ok(model) => {
                    log::info!("Breed model for {} loaded: {} breeds", config.species, config.breed_count());
                    store.with_breed_model(config.species, model)
                }
                Err(e) => {
                    log::error!("Breed model for {} unavailable: {}", config.species, e);
                    store.with_load_failure(config.species, e.to_string())
                }
            };
        }

        log::info!(
            "Model store ready: {} breed model(s), {} failure(s)",
            store.breed_models.len(),
            store.load_failures.len()
        );
        Ok(store)
    }

    pub fn species_detector(&self) -> &dyn ScoreModel {
        self.species_detector.as_ref()
    }

    pub fn breed_model(&self, species: SpeciesId) -> Option<&dyn ScoreModel> {
        self.breed_models.get(&species).map(|m| m.as_ref())
    }

    pub fn has_breed_model(&self, species: SpeciesId) -> bool {
        self.breed_models.contains_key(&species)
    }

    pub fn load_failure(&self, species: SpeciesId) -> Option<&str> {
        self.load_failures.get(&species).map(String::as_str)
    }
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut loaded: Vec<_> = self.breed_models.keys().collect();
        loaded.sort();
        f.debug_struct("ModelStore")
            .field("species_detector", &self.species_detector.name())
            .field("breed_models", &loaded)
            .field("load_failures", &self.load_failures)
            .finish()
    }
}
