//! Configuration for the `petid` command.
//!
//! Sources, highest priority first:
//! - CLI arguments
//! - Environment variables (`PETID_*`, via clap `env`)
//! - TOML config file (`petid.toml` by default, optional)
//! - Defaults

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::{SpeciesId, DEFAULT_INPUT_SIZE};
use petid_pipeline::{DetectionPolicy, ServiceConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Command-line arguments for PetID.
#[derive(Parser, Debug, Clone)]
#[command(name = "petid")]
#[command(about = "PetID - species-first, breed-second pet classification")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(long, short = 'c', default_value = "petid.toml", env = "PETID_CONFIG")]
    pub config: PathBuf,

    /// Directory with breed models and label files
    #[arg(long, env = "PETID_MODEL_DATA")]
    pub model_data: Option<PathBuf>,

    /// Generic species classifier (ONNX), relative to the model directory unless absolute
    #[arg(long, env = "PETID_DETECTOR_MODEL")]
    pub detector_model: Option<PathBuf>,

    /// first-match or highest-confidence
    #[arg(long, env = "PETID_DETECTION_POLICY")]
    pub detection_policy: Option<DetectionPolicy>,

    /// ONNX Runtime intra-op threads per model
    #[arg(long, env = "PETID_THREADS")]
    pub threads: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print every registered species with its breed-model status
    Species,

    /// Print the full breed catalog of one species
    Breeds {
        #[arg(long, short = 's')]
        species: SpeciesId,
    },

    /// Detect the species of an image without classifying its breed
    Detect(ImageArgs),

    /// Run the full species and breed cascade on an image
    Predict(ImageArgs),
}

/// Raw, already resized RGB8 pixels (row-major, 3 bytes per pixel).
#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct ImageArgs {
    #[arg(long)]
    pub pixels: PathBuf,

    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    pub width: usize,

    #[arg(long, default_value_t = DEFAULT_INPUT_SIZE)]
    pub height: usize,
}

/// Full configuration (merged from all sources).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetIdConfig {
    pub service: ServiceConfig,
}

impl PetIdConfig {
    /// Load configuration from CLI args and the optional config file.
    ///
    /// Priority: CLI args > Environment > Config file > Defaults
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config = if args.config.exists() {
            Self::from_file(&args.config)
                .with_context(|| format!("Failed to load config from {:?}", args.config))?
        } else {
            Self::default()
        };

        if let Some(ref model_data) = args.model_data {
            config.service.model_data_path = model_data.clone();
        }
        if let Some(ref detector_model) = args.detector_model {
            config.service.species_detector_model = detector_model.clone();
        }
        if let Some(policy) = args.detection_policy {
            config.service.detection_policy = policy;
        }
        if let Some(threads) = args.threads {
            config.service.inference_threads = threads;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file.
    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: PetIdConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }
}
