//! Registry construction against real label files on disk.

use common::{ModelStatus, SpeciesId, GENERIC_CLASS_COUNT};
use petid_species_registry::catalogs::DEFAULT_DOG_BREEDS;
use petid_species_registry::SpeciesRegistry;
use std::fs;
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_labels(dir: &TempDir, contents: &str) {
    fs::write(dir.path().join("class_labels.json"), contents).expect("Failed to write labels");
}

#[test]
fn test_dog_catalog_loaded_from_label_file() {
    init_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_labels(
        &dir,
        r#"{"class_names": ["Chihuahua", "Japanese spaniel", "Maltese dog"], "num_classes": 3}"#,
    );

    let registry = SpeciesRegistry::load(dir.path()).expect("registry builds");
    assert_eq!(
        registry.breeds(SpeciesId::Dog),
        &["Chihuahua".to_string(), "Japanese spaniel".to_string(), "Maltese dog".to_string()]
    );
}

#[test]
fn test_malformed_label_file_falls_back() {
    init_logging();
    let dir = TempDir::new().expect("Failed to create temp dir");
    write_labels(&dir, r#"{"class_names": ["Chihuahua"], "num_classes": 120}"#);

    let registry = SpeciesRegistry::load(dir.path()).expect("registry builds");
    assert_eq!(registry.breeds(SpeciesId::Dog).len(), DEFAULT_DOG_BREEDS.len());

    write_labels(&dir, "{ truncated");
    let registry = SpeciesRegistry::load(dir.path()).expect("registry builds");
    assert_eq!(registry.breeds(SpeciesId::Dog)[0], "Chihuahua");
    assert_eq!(registry.breeds(SpeciesId::Dog).len(), DEFAULT_DOG_BREEDS.len());
}

#[test]
fn test_rebuild_gives_identical_catalogs() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let names: Vec<String> = (0..120).map(|i| format!("breed_{:03}", i)).collect();
    let json = serde_json::json!({ "class_names": names, "num_classes": 120 });
    write_labels(&dir, &json.to_string());

    let first = SpeciesRegistry::load(dir.path()).expect("registry builds");
    let second = SpeciesRegistry::load(dir.path()).expect("registry builds");

    for species in SpeciesId::ALL {
        let a = serde_json::to_vec(first.breeds(species)).expect("serialize");
        let b = serde_json::to_vec(second.breeds(species)).expect("serialize");
        assert_eq!(a, b, "{} catalog differs between builds", species);
    }
    assert_eq!(first.breeds(SpeciesId::Dog).len(), 120);
}

#[test]
fn test_every_registered_species_holds_invariants() {
    let registry = SpeciesRegistry::load("/nonexistent").expect("registry builds");

    for config in registry.all() {
        assert!(config.confidence_threshold > 0.0 && config.confidence_threshold <= 1.0);
        assert!(!config.breeds.is_empty());
        assert!(!config.class_indices.is_empty());
        assert!(config.class_indices.iter().all(|&i| i < GENERIC_CLASS_COUNT));
        if config.status == ModelStatus::Trained {
            assert!(config.model_file.is_some());
        }
    }
}

#[test]
fn test_species_class_sets_do_not_overlap() {
    let registry = SpeciesRegistry::load("/nonexistent").expect("registry builds");
    let configs = registry.all();

    for (i, a) in configs.iter().enumerate() {
        for b in &configs[i + 1..] {
            assert!(
                a.class_indices.is_disjoint(&b.class_indices),
                "{} and {} share class indices",
                a.species,
                b.species
            );
        }
    }
}
