//! PetID command-line front end.
//!
//! Lists species and breed catalogs, and runs the species/breed cascade on raw RGB8
//! images. Results are printed as JSON on stdout; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::Parser;
use common::{ImageTensor, NormalizationScheme};
use petid_pipeline::{CascadeInput, PetIdService, PredictionError};
use petid_species_registry::SpeciesRegistry;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use crate::config::{CliArgs, Command, ImageArgs, PetIdConfig};

/// Input scheme of the generic species classifier.
const DETECTOR_SCHEME: NormalizationScheme = NormalizationScheme::CenteredUnit;

/// Schemes offered to breed models.
const BREED_SCHEMES: [NormalizationScheme; 2] = [
    NormalizationScheme::ScaledOffset,
    NormalizationScheme::CenteredUnit,
];

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Logs to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<ExitCode> {
    let config = PetIdConfig::load(args)?;
    info!("Model data: {:?}", config.service.model_data_path);

    match &args.command {
        Command::Species => {
            let registry = load_registry(&config)?;
            print_json(&registry.summary())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Breeds { species } => {
            let registry = load_registry(&config)?;
            let breeds = registry.breeds(*species);
            if breeds.is_empty() {
                bail!("Species not supported: {}", species);
            }
            print_json(&serde_json::json!({
                "species": species,
                "breeds": breeds,
                "count": breeds.len(),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Detect(image) => {
            let tensor = detector_tensor(&read_pixels(image)?, image)?;
            let service = PetIdService::initialize(&config.service);
            report(service.detect_species(&tensor))
        }
        Command::Predict(image) => {
            let pixels = read_pixels(image)?;
            let input = cascade_input(&pixels, image)?;
            let service = PetIdService::initialize(&config.service);
            report(service.predict(&input))
        }
    }
}

fn load_registry(config: &PetIdConfig) -> Result<SpeciesRegistry> {
    SpeciesRegistry::load(&config.service.model_data_path).context("Failed to build species registry")
}

fn read_pixels(image: &ImageArgs) -> Result<Vec<u8>> {
    std::fs::read(&image.pixels).with_context(|| format!("Failed to read pixels from {:?}", image.pixels))
}

fn detector_tensor(pixels: &[u8], image: &ImageArgs) -> Result<ImageTensor> {
    ImageTensor::from_rgb8(pixels, image.height, image.width, DETECTOR_SCHEME)
        .context("Failed to build species detector tensor")
}

/// One detector tensor plus a breed tensor per scheme; the cascade picks the match.
fn cascade_input(pixels: &[u8], image: &ImageArgs) -> Result<CascadeInput> {
    let mut input = CascadeInput::shared(detector_tensor(pixels, image)?);
    for scheme in BREED_SCHEMES.into_iter().filter(|s| *s != DETECTOR_SCHEME) {
        let tensor = ImageTensor::from_rgb8(pixels, image.height, image.width, scheme)
            .with_context(|| format!("Failed to build {} breed tensor", scheme))?;
        input = input.with_breed_tensor(tensor);
    }
    Ok(input)
}

/// Print a result, or its failure record, and pick the exit status.
fn report<T: Serialize>(outcome: std::result::Result<T, PredictionError>) -> Result<ExitCode> {
    match outcome {
        Ok(value) => {
            print_json(&value)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Prediction failed ({}): {}", e.kind(), e);
            print_json(&e.to_record())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
