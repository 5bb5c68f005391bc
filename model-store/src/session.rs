//! ONNX Runtime-backed models.

use crate::error::{ModelStoreError, Result};
use crate::model::{check_input, check_output, ModelLoader, ScoreModel};
use common::{ImageTensor, TensorSpec};
use ort::inputs;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// One ONNX image classifier with its declared input/output contract.
///
/// The `ort::Session` sits behind a `Mutex`: concurrent requests against the same
/// model are serialized, requests against different models run in parallel.
pub struct OnnxModel {
    model_path: PathBuf,
    name: String,
    spec: TensorSpec,
    output_len: Option<usize>,
    session: Mutex<Session>,
}

impl OnnxModel {
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        spec: TensorSpec,
        output_len: Option<usize>,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        log::info!("Loading ONNX model from: {:?}", model_path);

        if !model_path.exists() {
            return Err(ModelStoreError::ModelFileMissing(model_path.to_path_buf()));
        }

        let session = Session::builder()
            .map_err(|e| ModelStoreError::SessionCreationFailed(e.to_string()))?
            // Graph optimization (Level3 = all optimizations)
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelStoreError::SessionCreationFailed(
                format!("Failed to set optimization level: {}", e)
            ))?
            .with_intra_threads(intra_threads)
            .map_err(|e| ModelStoreError::SessionCreationFailed(
                format!("Failed to set intra threads: {}", e)
            ))?
            .commit_from_file(model_path)
            .map_err(|e| ModelStoreError::ModelLoadFailed(e.to_string()))?;

        let name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx-model".to_string());

        log::info!("ONNX model {} loaded, input {}", name, spec);

        Ok(Self {
            model_path: model_path.to_path_buf(),
            name,
            spec,
            output_len,
            session: Mutex::new(session),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl ScoreModel for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> TensorSpec {
        self.spec
    }

    fn output_len(&self) -> Option<usize> {
        self.output_len
    }

    fn predict(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        check_input(self, tensor)?;

        let values = tensor.as_slice().ok_or_else(|| {
            ModelStoreError::InferenceFailed("tensor is not contiguous".to_string())
        })?;
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();

        let input = TensorRef::from_array_view((shape, values))
            .map_err(|e| ModelStoreError::InferenceFailed(format!("Failed to create input tensor: {}", e)))?;

        let mut session = lock_session(&self.session, &self.name);

        let outputs = session.run(inputs![input])
            .map_err(|e| ModelStoreError::InferenceFailed(format!("{}: {}", self.name, e)))?;

        let (_, scores) = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ModelStoreError::InferenceFailed(format!("Failed to extract scores: {}", e)))?;
        let scores = scores.to_vec();

        check_output(self, &scores)?;
        Ok(scores)
    }
}

/// Lock a session, taking it back if an earlier request panicked while holding it.
///
/// `Session::run` leaves no partial state behind, so a poisoned lock is still usable.
fn lock_session<'a, T>(session: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    session.lock().unwrap_or_else(|poisoned| {
        log::warn!("Session lock for {} was poisoned by a panicked request; recovering", name);
        poisoned.into_inner()
    })
}

/// Loads models as ONNX Runtime sessions.
#[derive(Debug, Clone)]
pub struct OnnxLoader {
    intra_threads: usize,
}

impl OnnxLoader {
    pub fn new(intra_threads: usize) -> Self {
        Self { intra_threads: intra_threads.max(1) }
    }
}

impl Default for OnnxLoader {
    fn default() -> Self {
        Self::new(4)
    }
}

impl ModelLoader for OnnxLoader {
    fn load(
        &self,
        path: &Path,
        spec: TensorSpec,
        output_len: Option<usize>,
    ) -> Result<Arc<dyn ScoreModel>> {
        let model = OnnxModel::load(path, spec, output_len, self.intra_threads)?;
        Ok(Arc::new(model))
    }
}
