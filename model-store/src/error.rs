use common::TensorSpec;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelStoreError>;

#[derive(Error, Debug)]
pub enum ModelStoreError {
    #[error("Model file not found: {0:?}")]
    ModelFileMissing(PathBuf),

    #[error("Failed to load model: {0}")]
    ModelLoadFailed(String),

    #[error("Failed to create session: {0}")]
    SessionCreationFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Input tensor {actual} does not match model input {expected}")]
    InputMismatch { expected: TensorSpec, actual: TensorSpec },

    #[error("Model produced {actual} outputs, expected {expected}")]
    OutputLengthMismatch { expected: usize, actual: usize },

    #[error("No model reference configured: {0}")]
    NotConfigured(String),
}
