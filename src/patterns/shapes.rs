//! Per-kind window predicates
//!
//! Each pattern kind is a predicate over a window of scenes. The consensus scan
//! in [`super::windows`] is shared; only what "holds" means differs by kind.

use super::confidence::{mean, slope};
use super::windows::ConsensusRun;
use crate::config::PatternThresholds;
use crate::types::{FeatureProfile, PatternKind, SupportingMetrics};
use std::ops::Range;

/// Read-only view of one document's sequences, with length-scaled thresholds
#[derive(Debug, Clone, Copy)]
pub(crate) struct ShapeInputs<'a> {
    pub signals: &'a [f64],
    pub recovery: &'a [f64],
    pub deltas: &'a [f64],
    pub profiles: &'a [FeatureProfile],
    /// Elevated signal level after length scaling
    pub elevated: f64,
    /// Baseline signal level after length scaling
    pub baseline: f64,
    pub thresholds: &'a PatternThresholds,
}

impl<'a> ShapeInputs<'a> {
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Smallest window the kind can be judged on
    pub fn min_window(&self, kind: PatternKind) -> usize {
        match kind {
            PatternKind::SurpriseCluster => self
                .thresholds
                .surprise_min_window
                .max(self.thresholds.min_persistence),
            _ => self.thresholds.min_persistence,
        }
    }

    /// Whether the kind's predicate holds over `range` (0-based positions)
    pub fn holds(&self, kind: PatternKind, range: Range<usize>) -> bool {
        let t = self.thresholds;
        match kind {
            PatternKind::SustainedDemand => {
                self.signals[range].iter().all(|s| *s > self.elevated)
            }
            PatternKind::LimitedRecovery => {
                self.recovery[range.clone()]
                    .iter()
                    .all(|r| *r < t.low_recovery)
                    && self.signals[range].iter().all(|s| *s > self.baseline)
            }
            PatternKind::SequenceRepetition => {
                let period = t.repetition_period;
                let mut scenes = range;
                scenes.all(|j| j >= period && self.similarity(j, period) >= t.repetition_similarity)
            }
            PatternKind::SurpriseCluster => {
                self.surprise_ratio(range) >= t.surprise_ratio
            }
            PatternKind::ConstructiveStrain => {
                mean(&self.signals[range.clone()]) > self.elevated
                    && (mean(&self.recovery[range.clone()]) > t.constructive_recovery
                        || mean(&self.deltas[range]) > t.constructive_progression)
            }
            PatternKind::DegenerativeFatigue => {
                let window = &self.signals[range.clone()];
                mean(window) > self.elevated
                    && slope(window) > t.degenerative_slope
                    && mean(&self.recovery[range]) < t.degenerative_recovery
            }
        }
    }

    /// Final 0-based range for a consensus run, or `None` if it falls short.
    ///
    /// A repetition run marks the later scene of each similar pair, so it is
    /// extended back by one period and must cover the minimum number of periods.
    pub fn finalize(&self, kind: PatternKind, run: &ConsensusRun) -> Option<Range<usize>> {
        let t = self.thresholds;
        match kind {
            PatternKind::SequenceRepetition => {
                let start = run.start.saturating_sub(t.repetition_period);
                let range = start..run.end + 1;
                let floor = t
                    .min_persistence
                    .max(t.repetition_period * t.repetition_min_periods);
                (range.len() >= floor).then_some(range)
            }
            _ => {
                let range = run.start..run.end + 1;
                (range.len() >= t.min_persistence).then_some(range)
            }
        }
    }

    /// Kind-specific supporting metrics over the final range
    pub fn extra_metrics(
        &self,
        kind: PatternKind,
        range: Range<usize>,
        metrics: &mut SupportingMetrics,
    ) {
        let t = self.thresholds;
        match kind {
            PatternKind::DegenerativeFatigue => {
                metrics.insert("signal_slope".to_string(), slope(&self.signals[range]));
            }
            PatternKind::SurpriseCluster => {
                metrics.insert("surprise_ratio".to_string(), self.surprise_ratio(range));
            }
            PatternKind::SequenceRepetition => {
                let period = t.repetition_period;
                let pairs: Vec<f64> = range
                    .filter(|j| *j >= period)
                    .map(|j| self.similarity(j, period))
                    .collect();
                metrics.insert("mean_similarity".to_string(), mean(&pairs));
                metrics.insert("period".to_string(), period as f64);
            }
            PatternKind::ConstructiveStrain => {
                metrics.insert(
                    "mean_structural_delta".to_string(),
                    mean(&self.deltas[range]),
                );
            }
            PatternKind::SustainedDemand | PatternKind::LimitedRecovery => {}
        }
    }

    fn similarity(&self, j: usize, period: usize) -> f64 {
        self.profiles[j].cosine_similarity(&self.profiles[j - period])
    }

    fn surprise_ratio(&self, range: Range<usize>) -> f64 {
        let window = &self.deltas[range];
        if window.is_empty() {
            return 0.0;
        }
        let surprising = window
            .iter()
            .filter(|d| **d > self.thresholds.surprise_delta)
            .count();
        surprising as f64 / window.len() as f64
    }
}
