//! PetID prediction pipeline
//!
//! Species-first, breed-second cascade composed from the registry and the model store:
//! - [`SpeciesDetector`]: generic-classifier scores to a species (top-15, per-species thresholds)
//! - [`BreedClassifier`]: trained breed model or deterministic placeholder ranking
//! - [`PredictionCascade`]: both stages plus metadata, with every fault converted to a
//!   tagged [`PredictionError`]
//! - [`PetIdService`]: startup wiring; a failed startup yields a disabled service
//!
//! # Example
//!
//! ```no_run
//! use common::{ImageTensor, NormalizationScheme};
//! use petid_pipeline::{CascadeInput, PetIdService, ServiceConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = PetIdService::initialize(&ServiceConfig::default());
//!
//! let pixels = vec![128u8; 224 * 224 * 3];
//! let detector = ImageTensor::from_rgb8(&pixels, 224, 224, NormalizationScheme::CenteredUnit)?;
//! let legacy = ImageTensor::from_rgb8(&pixels, 224, 224, NormalizationScheme::ScaledOffset)?;
//! let input = CascadeInput::shared(detector).with_breed_tensor(legacy);
//!
//! match service.predict(&input) {
//!     Ok(result) => println!("{} / {}", result.species, result.breed),
//!     Err(e) => println!("{}: {}", e.kind(), e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod breed;
pub mod cascade;
pub mod detector;
pub mod error;
pub mod service;
pub mod types;

pub use breed::{placeholder_confidences, placeholder_ranking, BreedClassifier, TOP_BREEDS};
pub use cascade::PredictionCascade;
pub use detector::{top_k_indices, DetectionPolicy, ParsePolicyError, SpeciesDetector, TOP_K};
pub use error::{FailureKind, FailureRecord, PredictionError, Result};
pub use service::{PetIdService, ServiceConfig};
pub use types::{
    BreedModelStatus, BreedPrediction, CascadeInput, Detection, ModelInfo, PredictionResult,
    RankedBreed,
};
