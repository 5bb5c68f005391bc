//! Service startup and the disabled state.

use common::{ImageTensor, NormalizationScheme, SpeciesId, TensorSpec};
use petid_model_store::{ModelLoader, ModelStoreError, Result as ModelResult, ScoreModel};
use petid_pipeline::{CascadeInput, FailureKind, PetIdService, ServiceConfig};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Scores every image as a golden retriever (class 207) or uniform breeds.
struct UniformModel {
    spec: TensorSpec,
    output_len: usize,
}

impl ScoreModel for UniformModel {
    fn name(&self) -> &str {
        "uniform"
    }

    fn spec(&self) -> TensorSpec {
        self.spec
    }

    fn output_len(&self) -> Option<usize> {
        Some(self.output_len)
    }

    fn predict(&self, _tensor: &ImageTensor) -> ModelResult<Vec<f32>> {
        if self.output_len == 1000 {
            let mut scores = vec![0.0; 1000];
            scores[207] = 0.8;
            Ok(scores)
        } else {
            Ok((0..self.output_len).map(|i| 1.0 / (i as f32 + 2.0)).collect())
        }
    }
}

/// Loads stubs for files that exist in the model directory.
struct StubLoader;

impl ModelLoader for StubLoader {
    fn load(&self, path: &Path, spec: TensorSpec, output_len: Option<usize>) -> ModelResult<Arc<dyn ScoreModel>> {
        if !path.exists() {
            return Err(ModelStoreError::ModelFileMissing(path.to_path_buf()));
        }
        Ok(Arc::new(UniformModel { spec, output_len: output_len.unwrap_or(1) }))
    }
}

fn model_dir(with_dog_model: bool) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("mobilenet_v2.onnx"), b"stub").expect("write detector");
    fs::write(
        dir.path().join("class_labels.json"),
        r#"{"class_names": ["Beagle", "Pug", "Boxer", "Poodle", "Husky", "Corgi", "Akita"], "num_classes": 7}"#,
    )
    .expect("write labels");
    if with_dog_model {
        fs::write(dir.path().join("dog_breed_model.onnx"), b"stub").expect("write breed model");
    }
    dir
}

fn config(dir: &TempDir) -> ServiceConfig {
    ServiceConfig {
        model_data_path: dir.path().to_path_buf(),
        ..Default::default()
    }
}

fn input() -> CascadeInput {
    let pixels = vec![64u8; 224 * 224 * 3];
    let detector = ImageTensor::from_rgb8(&pixels, 224, 224, NormalizationScheme::CenteredUnit).expect("tensor");
    let legacy = ImageTensor::from_rgb8(&pixels, 224, 224, NormalizationScheme::ScaledOffset).expect("tensor");
    CascadeInput::shared(detector).with_breed_tensor(legacy)
}

#[test]
fn test_initialize_with_stub_loader() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = model_dir(true);
    let service = PetIdService::initialize_with(&config(&dir), &StubLoader);

    assert!(service.is_ready());
    assert_eq!(service.disabled_reason(), None);
    assert_eq!(service.breeds(SpeciesId::Dog).expect("ready").len(), 7);
    assert!(service.is_species_trained(SpeciesId::Dog).expect("ready"));
    assert!(!service.is_species_trained(SpeciesId::Cat).expect("ready"));

    let result = service.predict(&input()).expect("prediction succeeds");
    assert_eq!(result.species, SpeciesId::Dog);
    assert_eq!(result.breed, "Beagle");
    assert_eq!(result.model_info.total_breeds, 7);
    assert_eq!(result.model_info.species_supported.len(), 4);
}

#[test]
fn test_missing_breed_model_only_affects_that_species() {
    let dir = model_dir(false);
    let service = PetIdService::initialize_with(&config(&dir), &StubLoader);
    assert!(service.is_ready());

    let err = service.predict(&input()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::ModelUnavailable);

    let summary = service.species_summary().expect("ready");
    assert_eq!(summary.len(), 4);
}

#[test]
fn test_missing_detector_disables_service() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = PetIdService::initialize_with(&config(&dir), &StubLoader);

    assert!(!service.is_ready());
    assert!(service.disabled_reason().expect("disabled").contains("mobilenet_v2.onnx"));

    let err = service.predict(&input()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::ServiceUnavailable);

    let pixels = vec![0u8; 224 * 224 * 3];
    let tensor = ImageTensor::from_rgb8(&pixels, 224, 224, NormalizationScheme::CenteredUnit).expect("tensor");
    assert_eq!(
        service.detect_species(&tensor).unwrap_err().kind(),
        FailureKind::ServiceUnavailable
    );
    assert_eq!(
        service.predict_breed(SpeciesId::Cat, &tensor).unwrap_err().kind(),
        FailureKind::ServiceUnavailable
    );
    assert!(service.breeds(SpeciesId::Dog).is_err());
}
