//! PetID model store
//!
//! Loads model artifacts once at startup and hands out shared, read-only handles:
//! - [`ScoreModel`]: the seam the prediction cascade calls (tensor in, scores out)
//! - [`ModelLoader`]: how artifacts become handles ([`OnnxLoader`] for ONNX Runtime)
//! - [`ModelStore`]: the generic species classifier plus each trained species' breed model
//!
//! Per-species load failures are recorded, not propagated; only the generic classifier
//! is mandatory.

pub mod error;
pub mod model;
pub mod session;
pub mod store;

pub use error::{ModelStoreError, Result};
pub use model::{check_input, check_output, ModelLoader, ScoreModel};
pub use session::{OnnxLoader, OnnxModel};
pub use store::{species_detector_spec, ModelStore};

/// Re-export `ort` for callers that need the raw runtime.
pub use ort;
