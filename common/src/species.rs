//! Species identifiers and breed-model maturity tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pet species recognized by the cascade.
///
/// Use the enum, not strings, for species values. The string form is only
/// produced at the edges (`as_str`, serde) and parsed back with `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesId {
    Dog,
    Cat,
    Bird,
    Rabbit,
}

impl SpeciesId {
    /// Every supported species, in registry order.
    pub const ALL: [SpeciesId; 4] = [Self::Dog, Self::Cat, Self::Bird, Self::Rabbit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dog => "dog",
            Self::Cat => "cat",
            Self::Bird => "bird",
            Self::Rabbit => "rabbit",
        }
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown species: {0}")]
pub struct ParseSpeciesError(pub String);

impl FromStr for SpeciesId {
    type Err = ParseSpeciesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dog" => Ok(Self::Dog),
            "cat" => Ok(Self::Cat),
            "bird" => Ok(Self::Bird),
            "rabbit" => Ok(Self::Rabbit),
            other => Err(ParseSpeciesError(other.to_string())),
        }
    }
}

/// Maturity of a species' breed classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    /// A trained breed model exists and is loaded at startup.
    Trained,
    /// No model yet; breed output is a deterministic placeholder ranking.
    Placeholder,
    /// A model is being trained offline; behaves like `Placeholder` until shipped.
    Training,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trained => "trained",
            Self::Placeholder => "placeholder",
            Self::Training => "training",
        }
    }

    /// Returns true if a loadable breed model is expected for this status.
    pub fn expects_model(&self) -> bool {
        matches!(self, Self::Trained)
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
