//! Fatigue-state classification
//!
//! A stateless mapping from the attentional signal to an ordinal label, with
//! thresholds relaxed for shorter documents.

use crate::config::{FatigueThresholds, LengthNormalization};
use crate::types::FatigueState;

/// Threshold multiplier for a document of `total_scenes` scenes.
///
/// - `1.0` at or above `standard_scenes`
/// - linear from `mid_factor` down to `1.0` between `short_scenes` and `standard_scenes`
/// - `short_factor` below `short_scenes`
pub fn length_factor(total_scenes: usize, length: &LengthNormalization) -> f64 {
    if total_scenes >= length.standard_scenes {
        1.0
    } else if total_scenes >= length.short_scenes {
        let span = (length.standard_scenes - length.short_scenes) as f64;
        let remaining = (length.standard_scenes - total_scenes) as f64;
        1.0 + remaining / span * (length.mid_factor - 1.0)
    } else {
        length.short_factor
    }
}

/// Length-adjusted fatigue classifier
#[derive(Debug, Clone, Copy)]
pub struct FatigueClassifier {
    elevated: f64,
    high: f64,
    extreme: f64,
}

impl FatigueClassifier {
    pub fn new(thresholds: &FatigueThresholds, length_factor: f64) -> Self {
        Self {
            elevated: thresholds.elevated * length_factor,
            high: thresholds.high * length_factor,
            extreme: thresholds.extreme * length_factor,
        }
    }

    pub fn classify(&self, signal: f64) -> FatigueState {
        if signal < self.elevated {
            FatigueState::Normal
        } else if signal < self.high {
            FatigueState::Elevated
        } else if signal < self.extreme {
            FatigueState::High
        } else {
            FatigueState::Extreme
        }
    }
}
