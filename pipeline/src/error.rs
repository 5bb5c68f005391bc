//! Prediction errors
//!
//! Every failure mode of the cascade, each with a stable wire tag (`FailureKind`).
//! Faults are converted into these at stage boundaries; nothing else leaves the cascade.

use common::SpeciesId;
use petid_model_store::ModelStoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error(
        "Could not identify the animal's species. Make sure the image clearly shows a dog, cat, bird or rabbit."
    )]
    SpeciesNotDetected,

    #[error("Species not supported: {0}")]
    SpeciesNotSupported(SpeciesId),

    #[error("Model unavailable ({target}): {reason}")]
    ModelUnavailable { target: String, reason: String },

    #[error("Preprocessing mismatch: {0}")]
    PreprocessingMismatch(String),

    #[error("Internal prediction error: {0}")]
    Internal(String),

    #[error("Prediction service unavailable: {0}")]
    ServiceUnavailable(String),
}

pub type Result<T> = std::result::Result<T, PredictionError>;

/// Wire tag of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SpeciesNotDetected,
    SpeciesNotSupported,
    ModelUnavailable,
    PreprocessingMismatch,
    PredictionFailed,
    ServiceUnavailable,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeciesNotDetected => "species_not_detected",
            Self::SpeciesNotSupported => "species_not_supported",
            Self::ModelUnavailable => "model_unavailable",
            Self::PreprocessingMismatch => "preprocessing_mismatch",
            Self::PredictionFailed => "prediction_failed",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable failure record for callers that report errors as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub success: bool,
    pub error: FailureKind,
    pub message: String,
}

impl PredictionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SpeciesNotDetected => FailureKind::SpeciesNotDetected,
            Self::SpeciesNotSupported(_) => FailureKind::SpeciesNotSupported,
            Self::ModelUnavailable { .. } => FailureKind::ModelUnavailable,
            Self::PreprocessingMismatch(_) => FailureKind::PreprocessingMismatch,
            Self::Internal(_) => FailureKind::PredictionFailed,
            Self::ServiceUnavailable(_) => FailureKind::ServiceUnavailable,
        }
    }

    /// Convert a model-store error raised while running `target`.
    pub fn from_model_error(target: &str, err: ModelStoreError) -> Self {
        match err {
            ModelStoreError::InputMismatch { expected, actual } => Self::PreprocessingMismatch(format!(
                "{} expects {}, got {}",
                target, expected, actual
            )),
            other => Self::ModelUnavailable {
                target: target.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn to_record(&self) -> FailureRecord {
        FailureRecord {
            success: false,
            error: self.kind(),
            message: self.to_string(),
        }
    }
}
