//! Document-level signal summary
//!
//! Aggregates over the whole temporal signal. Contrast (the spread between the
//! highest and lowest signal) feeds pattern confidence; everything else is
//! carried into the report for explanation.

use crate::config::LengthNormalization;
use crate::temporal::length_factor;
use crate::types::{FatigueState, TemporalSignal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate view of a temporal signal sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub scene_count: usize,
    pub peak_signal: f64,
    /// 1-based index of the first scene reaching the peak
    pub peak_scene: Option<usize>,
    pub mean_signal: f64,
    pub mean_effort: f64,
    pub total_recovery: f64,
    /// Highest minus lowest signal
    pub contrast: f64,
    pub length_factor: f64,
    /// Scene count per fatigue state
    pub state_counts: BTreeMap<FatigueState, usize>,
}

impl SignalSummary {
    pub fn from_signals(signals: &[TemporalSignal], length: &LengthNormalization) -> Self {
        let scene_count = signals.len();
        let mut state_counts = BTreeMap::new();
        for state in [
            FatigueState::Normal,
            FatigueState::Elevated,
            FatigueState::High,
            FatigueState::Extreme,
        ] {
            state_counts.insert(state, 0);
        }

        if signals.is_empty() {
            return Self {
                scene_count,
                peak_signal: 0.0,
                peak_scene: None,
                mean_signal: 0.0,
                mean_effort: 0.0,
                total_recovery: 0.0,
                contrast: 0.0,
                length_factor: length_factor(0, length),
                state_counts,
            };
        }

        let mut peak = &signals[0];
        let mut low = signals[0].attentional_signal;
        let mut signal_sum = 0.0;
        let mut effort_sum = 0.0;
        let mut total_recovery = 0.0;
        for signal in signals {
            if signal.attentional_signal > peak.attentional_signal {
                peak = signal;
            }
            low = low.min(signal.attentional_signal);
            signal_sum += signal.attentional_signal;
            effort_sum += signal.instantaneous_effort;
            total_recovery += signal.recovery_credit;
            *state_counts.entry(signal.fatigue_state).or_insert(0) += 1;
        }

        let n = scene_count as f64;
        Self {
            scene_count,
            peak_signal: peak.attentional_signal,
            peak_scene: Some(peak.scene_index),
            mean_signal: signal_sum / n,
            mean_effort: effort_sum / n,
            total_recovery,
            contrast: peak.attentional_signal - low,
            length_factor: length_factor(scene_count, length),
            state_counts,
        }
    }
}
