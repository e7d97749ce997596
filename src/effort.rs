//! Effort derivation
//!
//! This module turns a scene's feature record into the five group sub-scores
//! and the instantaneous effort E:
//! - Each group sub-score is the mean of its fields, clamped to [0, 1]
//! - E is the fixed-weight sum of the sub-scores, so E lies in [0, 1]

use crate::config::EffortWeights;
use crate::types::{FeatureProfile, SceneFeatures};

/// Fixed-weight effort model
#[derive(Debug, Clone, Copy)]
pub struct EffortModel {
    weights: EffortWeights,
}

impl EffortModel {
    pub fn new(weights: EffortWeights) -> Self {
        Self { weights }
    }

    /// Derive the five group sub-scores of a scene
    pub fn profile(features: &SceneFeatures) -> FeatureProfile {
        let ling = &features.linguistic_load;
        let dial = &features.dialogue_dynamics;
        let visual = &features.visual_abstraction;
        let refs = &features.referential_memory;

        FeatureProfile {
            linguistic: sub_score(&[
                ling.sentence_count,
                ling.mean_sentence_length,
                ling.sentence_length_variance,
            ]),
            dialogue: sub_score(&[
                dial.dialogue_turns,
                dial.speaker_switches,
                dial.turn_velocity,
            ]),
            visual: sub_score(&[visual.action_line_count, visual.continuous_action_runs]),
            referential: sub_score(&[
                refs.active_character_count,
                refs.character_reintroductions,
            ]),
            structural: sub_score(&[features.structural_change.event_boundary_score]),
        }
    }

    /// Instantaneous effort for a profile
    pub fn effort(&self, profile: &FeatureProfile) -> f64 {
        self.weights
            .as_array()
            .iter()
            .zip(profile.as_array().iter())
            .map(|(w, s)| w * s)
            .sum()
    }
}

/// Mean of a group's fields, clamped to the common [0, 1] range
fn sub_score(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    mean.clamp(0.0, 1.0)
}
