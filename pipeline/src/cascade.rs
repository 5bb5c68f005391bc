//! Two-stage prediction: species detection, then breed classification.

use crate::breed::{check_probabilities, BreedClassifier};
use crate::detector::{DetectionPolicy, SpeciesDetector};
use crate::error::{PredictionError, Result};
use crate::types::{
    BreedPrediction, CascadeInput, Detection, ModelInfo, PredictionResult, DETECTOR_METHOD,
    MODEL_VERSION,
};
use common::{ImageTensor, SpeciesId, TensorSpec, GENERIC_CLASS_COUNT};
use petid_model_store::{check_input, ModelStore};
use petid_species_registry::{SpeciesConfig, SpeciesRegistry};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

const SPECIES_DETECTOR_TARGET: &str = "species detector";

/// The full cascade over a shared registry and model store.
///
/// Holds no per-request state: any number of threads may call it at once.
#[derive(Debug, Clone)]
pub struct PredictionCascade {
    registry: Arc<SpeciesRegistry>,
    models: Arc<ModelStore>,
    detector: SpeciesDetector,
    species_supported: Vec<SpeciesId>,
}

impl PredictionCascade {
    pub fn new(registry: Arc<SpeciesRegistry>, models: Arc<ModelStore>, policy: DetectionPolicy) -> Self {
        let species_supported = registry
            .iter()
            .filter(|c| !c.status.expects_model() || models.has_breed_model(c.species))
            .map(|c| c.species)
            .collect();

        Self {
            registry,
            models,
            detector: SpeciesDetector::new(policy),
            species_supported,
        }
    }

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    pub fn models(&self) -> &ModelStore {
        &self.models
    }

    pub fn detector(&self) -> &SpeciesDetector {
        &self.detector
    }

    /// Species with a usable breed classifier (placeholder, or trained and loaded).
    pub fn species_supported(&self) -> &[SpeciesId] {
        &self.species_supported
    }

    /// Stage 1 only: run the generic classifier and map its scores to a species.
    pub fn detect_species(&self, tensor: &ImageTensor) -> Result<Detection> {
        guard(|| self.run_detector(tensor))
    }

    /// Stage 2 only, for an already known species.
    ///
    /// A species with no registry entry yields the `species_not_supported` record instead
    /// of an error.
    pub fn predict_breed(&self, species: SpeciesId, tensor: &ImageTensor) -> Result<BreedPrediction> {
        guard(|| match self.registry.get(species) {
            Some(config) => self.run_breed(config, |_| Ok(tensor)),
            None => {
                log::warn!("Breed prediction requested for unregistered species {}", species);
                Ok(BreedPrediction::unsupported())
            }
        })
    }

    /// Run the whole cascade on one image.
    pub fn predict(&self, input: &CascadeInput) -> Result<PredictionResult> {
        guard(|| self.run_cascade(input))
    }

    fn run_cascade(&self, input: &CascadeInput) -> Result<PredictionResult> {
        let detection = self.run_detector(input.detector_tensor())?;
        let (species, species_confidence) = match detection {
            Detection::Species { species, confidence, .. } => (species, confidence),
            Detection::Unknown => return Err(PredictionError::SpeciesNotDetected),
        };

        // The detector only reports registered species; this guards a registry/detector mix-up.
        let config = self
            .registry
            .get(species)
            .ok_or(PredictionError::SpeciesNotSupported(species))?;

        let breed = self.run_breed(config, |spec| select_breed_tensor(input, spec))?;

        log::info!(
            "Predicted {} ({:.3}) / {} ({:.3}) via {}",
            species,
            species_confidence,
            breed.breed,
            breed.confidence,
            breed.status
        );

        Ok(PredictionResult {
            species,
            species_confidence,
            breed: breed.breed,
            breed_confidence: breed.confidence,
            top_5_predictions: breed.top_5,
            model_info: ModelInfo {
                species_detector: DETECTOR_METHOD.to_string(),
                breed_model_status: breed.status,
                total_breeds: config.breed_count(),
                species_supported: self.species_supported.clone(),
                confidence_threshold: config.confidence_threshold,
                model_version: MODEL_VERSION.to_string(),
                species_name: config.display_name.clone(),
                species_description: config.description.clone(),
            },
        })
    }

    fn run_detector(&self, tensor: &ImageTensor) -> Result<Detection> {
        let model = self.models.species_detector();
        check_input(model, tensor)
            .map_err(|e| PredictionError::from_model_error(SPECIES_DETECTOR_TARGET, e))?;

        let scores = model
            .predict(tensor)
            .map_err(|e| PredictionError::from_model_error(SPECIES_DETECTOR_TARGET, e))?;

        if scores.len() != GENERIC_CLASS_COUNT {
            return Err(PredictionError::ModelUnavailable {
                target: SPECIES_DETECTOR_TARGET.to_string(),
                reason: format!("expected {} scores, got {}", GENERIC_CLASS_COUNT, scores.len()),
            });
        }

        check_probabilities(SPECIES_DETECTOR_TARGET, &scores)?;

        Ok(self.detector.detect(&self.registry, &scores))
    }

    fn run_breed<'t, F>(&self, config: &SpeciesConfig, select_tensor: F) -> Result<BreedPrediction>
    where
        F: FnOnce(Option<TensorSpec>) -> Result<&'t ImageTensor>,
    {
        let classifier = BreedClassifier::select(config, &self.models)?;
        let tensor = select_tensor(classifier.input_spec())?;
        classifier.classify(tensor)
    }
}

/// Breed tensor matching the classifier's contract; placeholders take any.
fn select_breed_tensor(input: &CascadeInput, spec: Option<TensorSpec>) -> Result<&ImageTensor> {
    let Some(spec) = spec else {
        return Ok(input.breed_tensor());
    };

    input.breed_tensor_for(&spec).ok_or_else(|| {
        let offered: Vec<String> = input.breed_specs().iter().map(ToString::to_string).collect();
        PredictionError::PreprocessingMismatch(format!(
            "breed model expects {}, offered [{}]",
            spec,
            offered.join(", ")
        ))
    })
}

/// Convert a panic inside a stage into `prediction_failed`.
fn guard<T>(stage: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(stage)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        log::error!("Prediction stage panicked: {}", message);
        Err(PredictionError::Internal(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "model panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_catches_panics() {
        let result: Result<()> = guard(|| panic!("ort exploded"));
        assert_eq!(result, Err(PredictionError::Internal("ort exploded".to_string())));
    }

    #[test]
    fn test_guard_passes_errors_through() {
        let result: Result<()> = guard(|| Err(PredictionError::SpeciesNotDetected));
        assert_eq!(result, Err(PredictionError::SpeciesNotDetected));
    }
}
