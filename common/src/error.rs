//! Error types for tensor construction.

use thiserror::Error;

/// Result type alias for tensor operations.
pub type TensorResult<T> = Result<T, TensorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("Pixel buffer has {actual} bytes, expected {expected} for {height}x{width} RGB")]
    PixelCountMismatch {
        expected: usize,
        actual: usize,
        height: usize,
        width: usize,
    },

    #[error("Invalid tensor dimensions: {0}")]
    InvalidDimensions(String),
}
