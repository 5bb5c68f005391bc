use common::SpeciesId;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Label file not found: {0:?}")]
    LabelFileMissing(PathBuf),

    #[error("Failed to read label file {path:?}: {source}")]
    LabelFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed label file: {0}")]
    MalformedLabels(String),

    #[error("Invalid configuration for {species}: {reason}")]
    InvalidConfig { species: SpeciesId, reason: String },

    #[error("Species registered twice: {0}")]
    DuplicateSpecies(SpeciesId),

    #[error("Registry has no species")]
    Empty,
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::MalformedLabels(err.to_string())
    }
}
