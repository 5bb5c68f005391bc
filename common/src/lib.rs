//! Common types shared across the PetID workspace crates.
//!
//! This crate provides the foundational vocabulary used by the species registry,
//! the model store and the prediction pipeline:
//! - [`SpeciesId`] and [`ModelStatus`] for per-species configuration
//! - [`ImageTensor`], [`TensorSpec`] and [`NormalizationScheme`] for model inputs
//!
//! # Architecture
//!
//! The `common` crate sits at the bottom of the dependency hierarchy:
//! - Has NO dependencies on other workspace crates
//! - Provides shared types that all other crates can use
//! - Ensures type consistency across the entire system

pub mod error;
pub mod species;
pub mod tensor;

pub use error::{TensorError, TensorResult};
pub use species::{ModelStatus, ParseSpeciesError, SpeciesId};
pub use tensor::{ImageTensor, NormalizationScheme, ResizeFilter, TensorSpec};

/// Number of classes in the generic species classifier's taxonomy (ImageNet-1k).
pub const GENERIC_CLASS_COUNT: usize = 1000;

/// Square input edge expected by the MobileNet-family models.
pub const DEFAULT_INPUT_SIZE: usize = 224;
