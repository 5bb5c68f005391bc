//! The process-wide species table.

use crate::catalogs::{SpeciesDefinition, BUILTIN_SPECIES};
use crate::config::SpeciesConfig;
use crate::error::{RegistryError, Result};
use crate::labels::load_breed_labels;
use common::SpeciesId;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How many breeds a summary lists before truncating.
pub const SUMMARY_BREED_LIMIT: usize = 10;

/// Immutable, ordered mapping from species to configuration.
///
/// Built once at startup and shared read-only (`Arc<SpeciesRegistry>`) by every request.
/// There are no mutating methods; changing breeds or species means building a new registry.
#[derive(Debug, Clone)]
pub struct SpeciesRegistry {
    model_data_path: PathBuf,
    configs: Vec<SpeciesConfig>,
    index: HashMap<SpeciesId, usize>,
}

/// Condensed per-species view for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesSummary {
    pub species: SpeciesId,
    pub name: String,
    pub breeds_count: usize,
    pub model_status: common::ModelStatus,
    pub description: String,
    pub breeds: Vec<String>,
    pub has_more_breeds: bool,
}

impl SpeciesRegistry {
    /// Build the registry from the built-in species table.
    ///
    /// Species with a labels file read their catalog from `model_data_path`; a missing or
    /// malformed file falls back to the built-in catalog with a warning. Never fails on label
    /// problems, only on a definition that breaks the config invariants.
    pub fn load<P: AsRef<Path>>(model_data_path: P) -> Result<Self> {
        let model_data_path = model_data_path.as_ref();
        log::info!("Initializing species registry from {:?}", model_data_path);

        let configs = BUILTIN_SPECIES
            .iter()
            .map(|def| SpeciesConfig::from_definition(def, resolve_catalog(def, model_data_path)))
            .collect();

        let registry = Self::from_configs(model_data_path, configs)?;

        for config in registry.iter() {
            log::info!(
                "  {} ({}): {} breeds, {}",
                config.species,
                config.display_name,
                config.breed_count(),
                config.status
            );
        }

        Ok(registry)
    }

    /// Build a registry from explicit configs. Order is preserved.
    pub fn from_configs<P: AsRef<Path>>(model_data_path: P, configs: Vec<SpeciesConfig>) -> Result<Self> {
        if configs.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut index = HashMap::with_capacity(configs.len());
        for (position, config) in configs.iter().enumerate() {
            config.validate()?;
            if index.insert(config.species, position).is_some() {
                return Err(RegistryError::DuplicateSpecies(config.species));
            }
        }

        Ok(Self {
            model_data_path: model_data_path.as_ref().to_path_buf(),
            configs,
            index,
        })
    }

    pub fn get(&self, species: SpeciesId) -> Option<&SpeciesConfig> {
        self.index.get(&species).map(|&i| &self.configs[i])
    }

    /// All configs in registry order.
    pub fn all(&self) -> &[SpeciesConfig] {
        &self.configs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SpeciesConfig> {
        self.configs.iter()
    }

    pub fn species(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.configs.iter().map(|c| c.species)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn contains(&self, species: SpeciesId) -> bool {
        self.index.contains_key(&species)
    }

    pub fn is_trained(&self, species: SpeciesId) -> bool {
        self.get(species).is_some_and(SpeciesConfig::is_trained)
    }

    /// Breed catalog of a species, empty if unregistered.
    pub fn breeds(&self, species: SpeciesId) -> &[String] {
        self.get(species).map(|c| c.breeds.as_slice()).unwrap_or(&[])
    }

    pub fn model_data_path(&self) -> &Path {
        &self.model_data_path
    }

    pub fn model_path(&self, species: SpeciesId) -> Option<PathBuf> {
        self.get(species)
            .and_then(|c| c.model_file.as_ref())
            .map(|file| self.model_data_path.join(file))
    }

    pub fn labels_path(&self, species: SpeciesId) -> Option<PathBuf> {
        self.get(species)
            .and_then(|c| c.labels_file.as_ref())
            .map(|file| self.model_data_path.join(file))
    }

    pub fn total_breeds(&self) -> usize {
        self.configs.iter().map(SpeciesConfig::breed_count).sum()
    }

    pub fn summary(&self) -> Vec<SpeciesSummary> {
        self.configs
            .iter()
            .map(|c| SpeciesSummary {
                species: c.species,
                name: c.display_name.clone(),
                breeds_count: c.breed_count(),
                model_status: c.status,
                description: c.description.clone(),
                breeds: c.breeds.iter().take(SUMMARY_BREED_LIMIT).cloned().collect(),
                has_more_breeds: c.breed_count() > SUMMARY_BREED_LIMIT,
            })
            .collect()
    }
}

fn fallback_catalog(def: &SpeciesDefinition) -> Vec<String> {
    def.fallback_breeds.iter().map(|s| s.to_string()).collect()
}

fn resolve_catalog(def: &SpeciesDefinition, model_data_path: &Path) -> Vec<String> {
    let Some(labels_file) = def.labels_file else {
        return fallback_catalog(def);
    };

    let path = model_data_path.join(labels_file);
    match load_breed_labels(&path) {
        Ok(breeds) => {
            log::info!("Loaded {} {} breeds from {:?}", breeds.len(), def.species, path);
            breeds
        }
        Err(e) => {
            log::warn!("{}; using {} built-in {} breeds", e, def.fallback_breeds.len(), def.species);
            fallback_catalog(def)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogs::DEFAULT_DOG_BREEDS;
    use common::ModelStatus;

    #[test]
    fn test_load_without_label_file_uses_fallback() {
        let registry = SpeciesRegistry::load("/nonexistent/model_data").expect("registry builds");

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.breeds(SpeciesId::Dog).len(), DEFAULT_DOG_BREEDS.len());
        assert!(registry.is_trained(SpeciesId::Dog));
        assert!(!registry.is_trained(SpeciesId::Cat));
        assert_eq!(registry.get(SpeciesId::Rabbit).map(|c| c.status), Some(ModelStatus::Placeholder));
    }

    #[test]
    fn test_registry_order_is_table_order() {
        let registry = SpeciesRegistry::load("/nonexistent").expect("registry builds");
        let order: Vec<_> = registry.species().collect();
        assert_eq!(order, vec![SpeciesId::Dog, SpeciesId::Cat, SpeciesId::Bird, SpeciesId::Rabbit]);
    }

    #[test]
    fn test_model_paths_resolve_against_data_dir() {
        let registry = SpeciesRegistry::load("/srv/petid").expect("registry builds");
        assert_eq!(
            registry.model_path(SpeciesId::Dog),
            Some(PathBuf::from("/srv/petid/dog_breed_model.onnx"))
        );
        assert_eq!(
            registry.labels_path(SpeciesId::Dog),
            Some(PathBuf::from("/srv/petid/class_labels.json"))
        );
        assert_eq!(registry.model_path(SpeciesId::Cat), None);
    }

    #[test]
    fn test_from_configs_rejects_duplicates_and_empty() {
        let cat = SpeciesConfig::placeholder(SpeciesId::Cat, vec!["Persian".into()], [281], 0.2);
        let err = SpeciesRegistry::from_configs("/tmp", vec![cat.clone(), cat]).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSpecies(SpeciesId::Cat)));

        assert!(matches!(SpeciesRegistry::from_configs("/tmp", vec![]), Err(RegistryError::Empty)));
    }

    #[test]
    fn test_summary_truncates_breeds() {
        let registry = SpeciesRegistry::load("/nonexistent").expect("registry builds");
        let summary = registry.summary();

        assert_eq!(summary.len(), 4);
        for entry in &summary {
            assert!(entry.breeds.len() <= SUMMARY_BREED_LIMIT);
            assert_eq!(entry.has_more_breeds, entry.breeds_count > SUMMARY_BREED_LIMIT);
        }
        assert_eq!(
            registry.total_breeds(),
            summary.iter().map(|s| s.breeds_count).sum::<usize>()
        );
    }

    #[test]
    fn test_unknown_species_lookups() {
        let cat = SpeciesConfig::placeholder(SpeciesId::Cat, vec!["Persian".into()], [281], 0.2);
        let registry = SpeciesRegistry::from_configs("/tmp", vec![cat]).expect("registry builds");

        assert!(registry.get(SpeciesId::Dog).is_none());
        assert!(registry.breeds(SpeciesId::Dog).is_empty());
        assert!(!registry.is_trained(SpeciesId::Dog));
        assert!(!registry.contains(SpeciesId::Dog));
    }
}
