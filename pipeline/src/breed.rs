//! Breed classification: trained model or deterministic placeholder.

use crate::detector::top_k_indices;
use crate::error::{PredictionError, Result};
use crate::types::{BreedModelStatus, BreedPrediction, RankedBreed};
use common::{ImageTensor, TensorSpec};
use petid_model_store::{check_input, ModelStore, ModelStoreError, ScoreModel};
use petid_species_registry::SpeciesConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Length of every ranked breed list.
pub const TOP_BREEDS: usize = 5;

/// Fixed seed of the placeholder jitter.
pub const PLACEHOLDER_SEED: u64 = 42;

/// Base confidences assigned to the first catalog breeds.
pub const PLACEHOLDER_BASE: [f32; 8] = [0.42, 0.28, 0.18, 0.12, 0.08, 0.06, 0.04, 0.02];

const PLACEHOLDER_JITTER: f32 = 0.05;
const PLACEHOLDER_MIN: f32 = 0.01;
const PLACEHOLDER_MAX_TOTAL: f32 = 0.95;

/// Slack allowed around [0, 1] for softmax rounding.
const PROBABILITY_TOLERANCE: f32 = 1e-4;

/// Reject score vectors that are not probabilities (non-finite or outside [0, 1]).
pub fn check_probabilities(target: &str, scores: &[f32]) -> Result<()> {
    let bad = scores.iter().enumerate().find(|&(_, &p)| {
        !p.is_finite() || p < -PROBABILITY_TOLERANCE || p > 1.0 + PROBABILITY_TOLERANCE
    });

    match bad {
        Some((idx, p)) => Err(PredictionError::ModelUnavailable {
            target: target.to_string(),
            reason: format!("output {} is {}, expected a probability in [0, 1]", idx, p),
        }),
        None => Ok(()),
    }
}

/// Jittered placeholder confidences for the first `count` catalog entries (at most 8).
///
/// Pure: the generator is created from [`PLACEHOLDER_SEED`] on every call. The ChaCha8
/// stream is fixed across `rand` releases.
pub fn placeholder_confidences(count: usize) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(PLACEHOLDER_SEED);

    let mut confidences: Vec<f32> = PLACEHOLDER_BASE
        .iter()
        .take(count)
        .map(|base| {
            let jitter: f32 = rng.random_range(-PLACEHOLDER_JITTER..=PLACEHOLDER_JITTER);
            (base + jitter).max(PLACEHOLDER_MIN)
        })
        .collect();

    let total: f32 = confidences.iter().sum();
    if total > PLACEHOLDER_MAX_TOTAL {
        let scale = PLACEHOLDER_MAX_TOTAL / total;
        for c in &mut confidences {
            *c *= scale;
        }
    }
    confidences
}

/// Content-independent top-5 for a catalog.
pub fn placeholder_ranking(breeds: &[String]) -> Vec<RankedBreed> {
    let confidences = placeholder_confidences(breeds.len());

    let mut pairs: Vec<(&String, f32)> = breeds.iter().zip(confidences).collect();
    // Stable: equal confidences keep catalog order.
    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));

    pairs
        .into_iter()
        .take(TOP_BREEDS)
        .enumerate()
        .map(|(i, (breed, confidence))| RankedBreed {
            breed: breed.clone(),
            confidence,
            rank: i + 1,
        })
        .collect()
}

/// Top-`n` catalog entries by probability, ties to the lower index.
pub fn rank_probabilities(breeds: &[String], probabilities: &[f32], n: usize) -> Vec<RankedBreed> {
    top_k_indices(probabilities, n.min(breeds.len()))
        .into_iter()
        .enumerate()
        .map(|(i, idx)| RankedBreed {
            breed: breeds[idx].clone(),
            confidence: probabilities[idx],
            rank: i + 1,
        })
        .collect()
}

/// Breed classifier selected for one species.
pub enum BreedClassifier<'a> {
    Trained {
        model: &'a dyn ScoreModel,
        breeds: &'a [String],
    },
    Placeholder {
        breeds: &'a [String],
    },
}

impl<'a> BreedClassifier<'a> {
    /// Pick the classifier for a species by its model status.
    ///
    /// A trained species whose model is not loaded is unavailable, not downgraded.
    pub fn select(config: &'a SpeciesConfig, models: &'a ModelStore) -> Result<Self> {
        if !config.status.expects_model() {
            return Ok(Self::Placeholder { breeds: &config.breeds });
        }

        match models.breed_model(config.species) {
            Some(model) => Ok(Self::Trained { model, breeds: &config.breeds }),
            None => Err(PredictionError::ModelUnavailable {
                target: format!("{} breed model", config.species),
                reason: models
                    .load_failure(config.species)
                    .unwrap_or("model not loaded")
                    .to_string(),
            }),
        }
    }

    pub fn status(&self) -> BreedModelStatus {
        match self {
            Self::Trained { .. } => BreedModelStatus::TrainedModel,
            Self::Placeholder { .. } => BreedModelStatus::PlaceholderModel,
        }
    }

    /// Input contract, if this classifier consumes the image at all.
    pub fn input_spec(&self) -> Option<TensorSpec> {
        match self {
            Self::Trained { model, .. } => Some(model.spec()),
            Self::Placeholder { .. } => None,
        }
    }

    pub fn classify(&self, tensor: &ImageTensor) -> Result<BreedPrediction> {
        match self {
            Self::Trained { model, breeds } => {
                let target = model.name();
                check_input(*model, tensor).map_err(|e| PredictionError::from_model_error(target, e))?;

                let probabilities = model
                    .predict(tensor)
                    .map_err(|e| PredictionError::from_model_error(target, e))?;

                if probabilities.len() != breeds.len() {
                    let err = ModelStoreError::OutputLengthMismatch {
                        expected: breeds.len(),
                        actual: probabilities.len(),
                    };
                    return Err(PredictionError::from_model_error(target, err));
                }
                check_probabilities(target, &probabilities)?;

                let top_5 = rank_probabilities(breeds, &probabilities, TOP_BREEDS);
                Ok(BreedPrediction::from_ranked(top_5, self.status()))
            }
            Self::Placeholder { breeds } => {
                Ok(BreedPrediction::from_ranked(placeholder_ranking(breeds), self.status()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Breed {}", i)).collect()
    }

    #[test]
    fn test_placeholder_confidences_are_pinned() {
        let expected: [f32; 8] = [
            0.30621824, 0.23269427, 0.112869725, 0.12878034,
            0.08367868, 0.04116509, 0.019047864, 0.025545795,
        ];
        let confidences = placeholder_confidences(8);
        assert_eq!(confidences.len(), expected.len());
        for (actual, expected) in confidences.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-6, "{} != {}", actual, expected);
        }

        // Three breeds: no rescale, same first three draws.
        let short = placeholder_confidences(3);
        for (actual, expected) in short.iter().zip([0.39240804f32, 0.2981896, 0.14463863]) {
            assert!((actual - expected).abs() < 1e-6, "{} != {}", actual, expected);
        }
    }

    #[test]
    fn test_probability_check() {
        assert!(check_probabilities("m", &[0.0, 0.5, 1.0]).is_ok());
        assert!(check_probabilities("m", &[0.2, 3.7]).is_err());
        assert!(check_probabilities("m", &[-0.5]).is_err());
        let err = check_probabilities("m", &[0.1, f32::NAN]).unwrap_err();
        assert_eq!(err.kind().as_str(), "model_unavailable");
    }

    #[test]
    fn test_placeholder_is_deterministic() {
        let breeds = catalog(15);
        assert_eq!(placeholder_ranking(&breeds), placeholder_ranking(&breeds));
    }

    #[test]
    fn test_placeholder_bounds() {
        let confidences = placeholder_confidences(8);
        assert_eq!(confidences.len(), 8);
        assert!(confidences.iter().all(|&c| c > 0.0));
        assert!(confidences.iter().sum::<f32>() <= PLACEHOLDER_MAX_TOTAL + 1e-5);
    }

    #[test]
    fn test_placeholder_short_catalog() {
        let ranking = placeholder_ranking(&catalog(3));
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_placeholder_sorted_descending() {
        let ranking = placeholder_ranking(&catalog(10));
        assert_eq!(ranking.len(), TOP_BREEDS);
        for pair in ranking.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_rank_probabilities() {
        let breeds = catalog(6);
        let ranking = rank_probabilities(&breeds, &[0.05, 0.4, 0.1, 0.3, 0.1, 0.05], 5);
        let names: Vec<_> = ranking.iter().map(|r| r.breed.as_str()).collect();
        assert_eq!(names, vec!["Breed 1", "Breed 3", "Breed 2", "Breed 4", "Breed 0"]);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[4].rank, 5);
    }
}
