//! Records produced by the cascade.

use common::{ImageTensor, SpeciesId, TensorSpec};
use serde::Serialize;
use std::fmt;

/// Identifier reported as the species-detection method.
pub const DETECTOR_METHOD: &str = "generic-classifier-cascade";

/// Version reported in prediction metadata.
pub const MODEL_VERSION: &str = "2.0.0";

/// Breed name used when no breed could be determined.
pub const UNKNOWN_BREED: &str = "Unknown";

/// Outcome of species detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Detection {
    Species {
        species: SpeciesId,
        confidence: f32,
        /// Generic-classifier class that provided the evidence.
        class_index: usize,
    },
    Unknown,
}

impl Detection {
    pub fn species(&self) -> Option<SpeciesId> {
        match self {
            Self::Species { species, .. } => Some(*species),
            Self::Unknown => None,
        }
    }

    /// Matched score, exactly `0.0` for `Unknown`.
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Species { confidence, .. } => *confidence,
            Self::Unknown => 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// One entry of a ranked breed list. Ranks start at 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBreed {
    pub breed: String,
    pub confidence: f32,
    pub rank: usize,
}

/// Which breed classifier produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreedModelStatus {
    TrainedModel,
    PlaceholderModel,
    SpeciesNotSupported,
}

impl BreedModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrainedModel => "trained_model",
            Self::PlaceholderModel => "placeholder_model",
            Self::SpeciesNotSupported => "species_not_supported",
        }
    }
}

impl fmt::Display for BreedModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the breed stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreedPrediction {
    pub breed: String,
    pub confidence: f32,
    pub top_5: Vec<RankedBreed>,
    pub status: BreedModelStatus,
}

impl BreedPrediction {
    /// Top breed and confidence are taken from the rank-1 entry.
    pub fn from_ranked(top_5: Vec<RankedBreed>, status: BreedModelStatus) -> Self {
        let (breed, confidence) = top_5
            .first()
            .map(|top| (top.breed.clone(), top.confidence))
            .unwrap_or_else(|| (UNKNOWN_BREED.to_string(), 0.0));

        Self { breed, confidence, top_5, status }
    }

    /// Degenerate record for a species with no registry entry.
    pub fn unsupported() -> Self {
        Self::from_ranked(Vec::new(), BreedModelStatus::SpeciesNotSupported)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub species_detector: String,
    pub breed_model_status: BreedModelStatus,
    pub total_breeds: usize,
    /// Species with any breed classifier available (trained and loaded, or placeholder).
    pub species_supported: Vec<SpeciesId>,
    pub confidence_threshold: f32,
    pub model_version: String,
    pub species_name: String,
    pub species_description: String,
}

/// Unified result of a full cascade run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub species: SpeciesId,
    pub species_confidence: f32,
    pub breed: String,
    pub breed_confidence: f32,
    pub top_5_predictions: Vec<RankedBreed>,
    pub model_info: ModelInfo,
}

/// Preprocessed tensors for one image.
///
/// The detector tensor feeds the generic classifier. Breed tensors are offered per input
/// contract; the cascade picks the one matching the selected breed model.
#[derive(Debug, Clone)]
pub struct CascadeInput {
    detector_tensor: ImageTensor,
    breed_tensors: Vec<ImageTensor>,
}

impl CascadeInput {
    pub fn new(detector_tensor: ImageTensor, breed_tensor: ImageTensor) -> Self {
        Self {
            detector_tensor,
            breed_tensors: vec![breed_tensor],
        }
    }

    /// Use one tensor for both stages.
    pub fn shared(tensor: ImageTensor) -> Self {
        Self::new(tensor.clone(), tensor)
    }

    /// Offer an additional breed tensor (e.g. another normalization scheme).
    pub fn with_breed_tensor(mut self, tensor: ImageTensor) -> Self {
        self.breed_tensors.push(tensor);
        self
    }

    pub fn detector_tensor(&self) -> &ImageTensor {
        &self.detector_tensor
    }

    /// First breed tensor offered.
    pub fn breed_tensor(&self) -> &ImageTensor {
        // Constructors always push at least one breed tensor.
        self.breed_tensors.first().unwrap_or(&self.detector_tensor)
    }

    pub fn breed_tensor_for(&self, spec: &TensorSpec) -> Option<&ImageTensor> {
        self.breed_tensors.iter().find(|t| t.matches(spec))
    }

    pub fn breed_specs(&self) -> Vec<TensorSpec> {
        self.breed_tensors.iter().map(ImageTensor::spec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::NormalizationScheme;

    fn ranked(entries: &[(&str, f32)]) -> Vec<RankedBreed> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (breed, confidence))| RankedBreed {
                breed: breed.to_string(),
                confidence: *confidence,
                rank: i + 1,
            })
            .collect()
    }

    #[test]
    fn test_detection_accessors() {
        let unknown = Detection::Unknown;
        assert_eq!(unknown.species(), None);
        assert_eq!(unknown.confidence(), 0.0);

        let dog = Detection::Species { species: SpeciesId::Dog, confidence: 0.9, class_index: 207 };
        assert_eq!(dog.species(), Some(SpeciesId::Dog));
        assert!(!dog.is_unknown());
    }

    #[test]
    fn test_breed_prediction_takes_rank_one() {
        let prediction = BreedPrediction::from_ranked(
            ranked(&[("Beagle", 0.7), ("Pug", 0.2)]),
            BreedModelStatus::TrainedModel,
        );
        assert_eq!(prediction.breed, "Beagle");
        assert_eq!(prediction.confidence, 0.7);
    }

    #[test]
    fn test_unsupported_prediction() {
        let prediction = BreedPrediction::unsupported();
        assert_eq!(prediction.breed, UNKNOWN_BREED);
        assert_eq!(prediction.confidence, 0.0);
        assert!(prediction.top_5.is_empty());
        assert_eq!(prediction.status.as_str(), "species_not_supported");
    }

    #[test]
    fn test_cascade_input_picks_matching_tensor() {
        let legacy = ImageTensor::from_rgb8(&[10u8; 12], 2, 2, NormalizationScheme::ScaledOffset).expect("tensor");
        let multi = ImageTensor::from_rgb8(&[10u8; 12], 2, 2, NormalizationScheme::CenteredUnit).expect("tensor");

        let input = CascadeInput::new(multi.clone(), multi.clone()).with_breed_tensor(legacy.clone());
        let spec = TensorSpec::new(2, 2, NormalizationScheme::ScaledOffset);

        assert_eq!(input.breed_tensor_for(&spec), Some(&legacy));
        assert_eq!(input.breed_tensor(), &multi);
        assert!(input.breed_tensor_for(&TensorSpec::new(4, 4, NormalizationScheme::ScaledOffset)).is_none());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&BreedModelStatus::PlaceholderModel).expect("Serialization failed");
        assert_eq!(json, r#""placeholder_model""#);
    }
}
