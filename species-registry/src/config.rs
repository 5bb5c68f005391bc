//! Per-species configuration record.

use crate::catalogs::SpeciesDefinition;
use crate::error::{RegistryError, Result};
use common::{ModelStatus, NormalizationScheme, SpeciesId, TensorSpec, GENERIC_CLASS_COUNT};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

/// Configuration of one species, immutable once inside a registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesConfig {
    pub species: SpeciesId,
    pub display_name: String,
    /// Ordered, unique breed names. Index `i` is output `i` of the breed model.
    pub breeds: Vec<String>,
    /// Generic-classifier class indices counted as evidence for this species.
    pub class_indices: BTreeSet<usize>,
    /// A match must score strictly above this to count. In (0, 1].
    pub confidence_threshold: f32,
    pub status: ModelStatus,
    /// Breed model artifact, relative to the registry's model-data directory.
    pub model_file: Option<PathBuf>,
    pub labels_file: Option<PathBuf>,
    /// Input contract of this species' breed model.
    pub input_spec: TensorSpec,
    pub description: String,
}

impl SpeciesConfig {
    /// Build a config from a built-in definition and an already-resolved catalog.
    pub fn from_definition(def: &SpeciesDefinition, breeds: Vec<String>) -> Self {
        Self {
            species: def.species,
            display_name: def.display_name.to_string(),
            breeds,
            class_indices: def.class_indices().collect(),
            confidence_threshold: def.confidence_threshold,
            status: def.status,
            model_file: def.model_file.map(PathBuf::from),
            labels_file: def.labels_file.map(PathBuf::from),
            input_spec: TensorSpec::mobilenet(def.normalization),
            description: def.description.to_string(),
        }
    }

    /// Minimal placeholder config, handy for custom registries.
    pub fn placeholder(
        species: SpeciesId,
        breeds: Vec<String>,
        class_indices: impl IntoIterator<Item = usize>,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            species,
            display_name: species.as_str().to_string(),
            breeds,
            class_indices: class_indices.into_iter().collect(),
            confidence_threshold,
            status: ModelStatus::Placeholder,
            model_file: None,
            labels_file: None,
            input_spec: TensorSpec::mobilenet(NormalizationScheme::CenteredUnit),
            description: String::new(),
        }
    }

    pub fn breed_count(&self) -> usize {
        self.breeds.len()
    }

    pub fn is_trained(&self) -> bool {
        self.status == ModelStatus::Trained
    }

    /// True if `class_index` is evidence for this species.
    pub fn matches_class(&self, class_index: usize) -> bool {
        self.class_indices.contains(&class_index)
    }

    /// Check the invariants every registered species must hold.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| RegistryError::InvalidConfig {
            species: self.species,
            reason,
        };

        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(invalid(format!(
                "confidence threshold {} outside (0, 1]",
                self.confidence_threshold
            )));
        }

        if self.class_indices.is_empty() {
            return Err(invalid("class index set is empty".to_string()));
        }

        if let Some(&max) = self.class_indices.iter().next_back() {
            if max >= GENERIC_CLASS_COUNT {
                return Err(invalid(format!(
                    "class index {} outside generic taxonomy of {}",
                    max, GENERIC_CLASS_COUNT
                )));
            }
        }

        validate_catalog(&self.breeds).map_err(|e| invalid(e.to_string()))?;

        if self.status.expects_model() && self.model_file.is_none() {
            return Err(invalid("trained species has no model file".to_string()));
        }

        Ok(())
    }
}

/// A catalog must be non-empty with unique, non-blank names.
pub fn validate_catalog(breeds: &[String]) -> Result<()> {
    if breeds.is_empty() {
        return Err(RegistryError::MalformedLabels("breed catalog is empty".to_string()));
    }

    let mut seen = HashSet::with_capacity(breeds.len());
    for name in breeds {
        if name.trim().is_empty() {
            return Err(RegistryError::MalformedLabels("blank breed name".to_string()));
        }
        if !seen.insert(name.as_str()) {
            return Err(RegistryError::MalformedLabels(format!("duplicate breed name: {}", name)));
        }
    }

    Ok(())
}
