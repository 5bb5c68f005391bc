//! Species detection over generic-classifier scores.

use crate::types::Detection;
use petid_species_registry::SpeciesRegistry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of top-scoring classes inspected per image.
pub const TOP_K: usize = 15;

/// How competing species matches in the top-K are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionPolicy {
    /// First species in registry order with a qualifying class wins.
    #[default]
    FirstMatch,
    /// Qualifying class with the highest score wins; ties go to registry order.
    HighestConfidence,
}

impl DetectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstMatch => "first-match",
            Self::HighestConfidence => "highest-confidence",
        }
    }
}

impl fmt::Display for DetectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown detection policy: {0} (expected first-match or highest-confidence)")]
pub struct ParsePolicyError(pub String);

impl FromStr for DetectionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "first-match" => Ok(Self::FirstMatch),
            "highest-confidence" => Ok(Self::HighestConfidence),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Sort key for a raw score: non-finite values rank below everything.
#[inline]
fn rank_key(score: f32) -> f32 {
    if score.is_finite() {
        score
    } else {
        f32::NEG_INFINITY
    }
}

/// Descending by score, then ascending by index.
#[inline]
fn compare_ranked(scores: &[f32], a: usize, b: usize) -> Ordering {
    rank_key(scores[b])
        .total_cmp(&rank_key(scores[a]))
        .then_with(|| a.cmp(&b))
}

/// Indices of the `k` highest scores, best first. Ties go to the lower index.
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, |&a, &b| compare_ranked(scores, a, b));
        indices.truncate(k);
    }
    indices.sort_unstable_by(|&a, &b| compare_ranked(scores, a, b));
    indices
}

/// Maps a generic-classifier score vector to a species.
///
/// Stateless apart from its policy; safe to share across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesDetector {
    policy: DetectionPolicy,
    top_k: usize,
}

impl Default for SpeciesDetector {
    fn default() -> Self {
        Self::new(DetectionPolicy::default())
    }
}

impl SpeciesDetector {
    pub fn new(policy: DetectionPolicy) -> Self {
        Self { policy, top_k: TOP_K }
    }

    pub fn policy(&self) -> DetectionPolicy {
        self.policy
    }

    /// Classify one score vector.
    ///
    /// A species qualifies when one of its classes is in the top-K and that class's score is
    /// strictly above the species' threshold. Returns [`Detection::Unknown`] otherwise.
    pub fn detect(&self, registry: &SpeciesRegistry, scores: &[f32]) -> Detection {
        let top = top_k_indices(scores, self.top_k);
        let mut best: Option<Detection> = None;

        for config in registry.iter() {
            let hit = top.iter().copied().find(|&idx| {
                let score = scores[idx];
                config.matches_class(idx) && score.is_finite() && score > config.confidence_threshold
            });

            let Some(class_index) = hit else { continue };
            let candidate = Detection::Species {
                species: config.species,
                confidence: scores[class_index],
                class_index,
            };

            match self.policy {
                DetectionPolicy::FirstMatch => {
                    best = Some(candidate);
                    break;
                }
                DetectionPolicy::HighestConfidence => {
                    if best.map_or(true, |b| candidate.confidence() > b.confidence()) {
                        best = Some(candidate);
                    }
                }
            }
        }

        let detection = best.unwrap_or(Detection::Unknown);
        match detection {
            Detection::Species { species, confidence, class_index } => log::debug!(
                "Detected {} (class {}, score {:.3}, policy {})",
                species,
                class_index,
                confidence,
                self.policy
            ),
            Detection::Unknown => log::debug!("No species above threshold in top-{}", self.top_k),
        }
        detection
    }
}
