//! PetID species registry
//!
//! Static, immutable table of per-species configuration, built once at startup:
//! - Breed catalogs (from the trained species' label file or built-in fallbacks)
//! - Generic-classifier class indices counted as evidence for each species
//! - Per-species confidence thresholds
//! - Breed-model maturity (`trained` / `placeholder` / `training`) and artifact paths
//!
//! # Example
//!
//! ```no_run
//! use petid_species_registry::SpeciesRegistry;
//! use common::SpeciesId;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SpeciesRegistry::load("model_data")?;
//! assert!(registry.is_trained(SpeciesId::Dog));
//! for config in registry.all() {
//!     println!("{}: {} breeds", config.species, config.breed_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalogs;
pub mod config;
pub mod error;
pub mod labels;
pub mod registry;

pub use config::SpeciesConfig;
pub use error::{RegistryError, Result};
pub use labels::{load_breed_labels, parse_breed_labels};
pub use registry::{SpeciesRegistry, SpeciesSummary};
