//! The startup-built prediction service.

use crate::cascade::PredictionCascade;
use crate::detector::DetectionPolicy;
use crate::error::{PredictionError, Result};
use crate::types::{BreedPrediction, CascadeInput, Detection, PredictionResult};
use common::{ImageTensor, SpeciesId};
use petid_model_store::{ModelLoader, ModelStore, OnnxLoader};
use petid_species_registry::{SpeciesRegistry, SpeciesSummary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings needed to bring the service up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding breed models and label files.
    pub model_data_path: PathBuf,
    /// Generic classifier artifact; relative paths resolve against `model_data_path`.
    pub species_detector_model: PathBuf,
    pub detection_policy: DetectionPolicy,
    /// ONNX Runtime intra-op threads per session.
    pub inference_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_data_path: PathBuf::from("model_data"),
            species_detector_model: PathBuf::from("mobilenet_v2.onnx"),
            detection_policy: DetectionPolicy::default(),
            inference_threads: 4,
        }
    }
}

impl ServiceConfig {
    pub fn species_detector_path(&self) -> PathBuf {
        if self.species_detector_model.is_absolute() {
            self.species_detector_model.clone()
        } else {
            self.model_data_path.join(&self.species_detector_model)
        }
    }
}

#[derive(Debug)]
enum ServiceState {
    Ready(PredictionCascade),
    Disabled { reason: String },
}

/// Process-wide prediction service.
///
/// Built once by [`PetIdService::initialize`]. If startup fails the service is
/// disabled and every call returns [`PredictionError::ServiceUnavailable`].
#[derive(Debug)]
pub struct PetIdService {
    state: ServiceState,
}

impl PetIdService {
    /// Load the registry and models from disk with ONNX Runtime.
    pub fn initialize(config: &ServiceConfig) -> Self {
        Self::initialize_with(config, &OnnxLoader::new(config.inference_threads))
    }

    /// Same as [`initialize`](Self::initialize) with a custom model loader.
    pub fn initialize_with(config: &ServiceConfig, loader: &dyn ModelLoader) -> Self {
        log::info!("Initializing PetID service (policy {})", config.detection_policy);

        let registry = match SpeciesRegistry::load(&config.model_data_path) {
            Ok(registry) => registry,
            Err(e) => return Self::disabled(format!("species registry: {}", e)),
        };

        let detector_path = config.species_detector_path();
        let models = match ModelStore::load(&registry, &detector_path, loader) {
            Ok(models) => models,
            Err(e) => return Self::disabled(format!("species detector {}: {}", detector_path.display(), e)),
        };

        let cascade = PredictionCascade::new(Arc::new(registry), Arc::new(models), config.detection_policy);
        log::info!(
            "PetID service ready: {} species, {} with a breed classifier",
            cascade.registry().len(),
            cascade.species_supported().len()
        );
        Self::ready(cascade)
    }

    pub fn ready(cascade: PredictionCascade) -> Self {
        Self { state: ServiceState::Ready(cascade) }
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::error!("PetID service disabled: {}", reason);
        Self { state: ServiceState::Disabled { reason } }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ServiceState::Ready(_))
    }

    pub fn disabled_reason(&self) -> Option<&str> {
        match &self.state {
            ServiceState::Ready(_) => None,
            ServiceState::Disabled { reason } => Some(reason),
        }
    }

    fn cascade(&self) -> Result<&PredictionCascade> {
        match &self.state {
            ServiceState::Ready(cascade) => Ok(cascade),
            ServiceState::Disabled { reason } => Err(PredictionError::ServiceUnavailable(reason.clone())),
        }
    }

    pub fn predict(&self, input: &CascadeInput) -> Result<PredictionResult> {
        self.cascade()?.predict(input)
    }

    pub fn detect_species(&self, tensor: &ImageTensor) -> Result<Detection> {
        self.cascade()?.detect_species(tensor)
    }

    pub fn predict_breed(&self, species: SpeciesId, tensor: &ImageTensor) -> Result<BreedPrediction> {
        self.cascade()?.predict_breed(species, tensor)
    }

    pub fn species_summary(&self) -> Result<Vec<SpeciesSummary>> {
        Ok(self.cascade()?.registry().summary())
    }

    /// Full catalog of one species, empty if the species is not registered.
    pub fn breeds(&self, species: SpeciesId) -> Result<Vec<String>> {
        Ok(self.cascade()?.registry().breeds(species).to_vec())
    }

    pub fn is_species_trained(&self, species: SpeciesId) -> Result<bool> {
        Ok(self.cascade()?.registry().is_trained(species))
    }

    pub fn model_data_path(&self) -> Option<&Path> {
        self.cascade().ok().map(|c| c.registry().model_data_path())
    }
}
