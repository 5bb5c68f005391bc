//! Model seams: what the cascade needs from a loaded model, and how models get loaded.

use crate::error::{ModelStoreError, Result};
use common::{ImageTensor, TensorSpec};
use std::path::Path;
use std::sync::Arc;

/// A loaded model mapping one image tensor to a score vector.
///
/// Implemented by the ONNX adapter and by test doubles. Handles are shared read-only
/// across requests, so implementations must be `Send + Sync`; an implementation whose
/// runtime is not reentrant serializes calls internally.
pub trait ScoreModel: Send + Sync {
    /// Human-readable identifier for logs and error messages.
    fn name(&self) -> &str;

    /// Input contract the tensor must satisfy.
    fn spec(&self) -> TensorSpec;

    /// Expected length of the output vector, if fixed.
    fn output_len(&self) -> Option<usize>;

    /// Run inference on one image.
    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>>;
}

/// Loads model artifacts from disk at startup.
pub trait ModelLoader {
    fn load(
        &self,
        path: &Path,
        spec: TensorSpec,
        output_len: Option<usize>,
    ) -> Result<Arc<dyn ScoreModel>>;
}

/// Reject tensors that do not match the model's input contract.
pub fn check_input(model: &dyn ScoreModel, tensor: &ImageTensor) -> Result<()> {
    let expected = model.spec();
    if tensor.matches(&expected) {
        Ok(())
    } else {
        Err(ModelStoreError::InputMismatch { expected, actual: tensor.spec() })
    }
}

/// Reject score vectors whose length differs from the model's declared output.
pub fn check_output(model: &dyn ScoreModel, scores: &[f32]) -> Result<()> {
    match model.output_len() {
        Some(expected) if expected != scores.len() => Err(ModelStoreError::OutputLengthMismatch {
            expected,
            actual: scores.len(),
        }),
        _ => Ok(()),
    }
}
