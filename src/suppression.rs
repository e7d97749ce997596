//! Writer-intent suppression
//!
//! A downstream filter over detected patterns. Writers may mark scene ranges
//! with a declared intent; patterns inside a marked range are withheld from
//! the surfaced list. This stage only reads descriptors and can only lower
//! their confidence.

use crate::error::AnalysisError;
use crate::types::{ConfidenceBand, PatternDescriptor, PatternKind, SceneRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Declared writer intent for a scene range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriterIntent {
    IntentionallyExhausting,
    IntentionallyConfusing,
    ShouldFeelSmooth,
    ShouldFeelTense,
    Experimental,
}

/// A scene range carrying one declared intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentInterval {
    pub scene_range: SceneRange,
    pub intent: WriterIntent,
}

/// Note raised while applying intents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "note_type", rename_all = "snake_case")]
pub enum SuppressionNote {
    /// Two overlapping intervals declare different intents
    IntentConflict {
        scene_range: SceneRange,
        intents: Vec<WriterIntent>,
    },
    /// A pattern lay wholly inside a declared interval
    Suppressed {
        pattern_type: PatternKind,
        intent: WriterIntent,
        scene_range: SceneRange,
    },
    /// Part of a pattern lay inside a declared interval
    PartialSuppression {
        pattern_type: PatternKind,
        intent: WriterIntent,
        /// Part withheld
        scene_range: SceneRange,
        /// Part surfaced at low confidence, if long enough to keep
        remainder: Option<SceneRange>,
    },
}

/// Result of applying writer intents to a pattern list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuppressionOutcome {
    pub surfaced: Vec<PatternDescriptor>,
    pub suppressed: Vec<PatternDescriptor>,
    pub notes: Vec<SuppressionNote>,
}

/// Applies validated intent intervals to detected patterns
#[derive(Debug, Clone)]
pub struct IntentSuppressor {
    intervals: Vec<IntentInterval>,
    min_remainder: usize,
}

impl IntentSuppressor {
    /// Validate intervals against a document of `scene_count` scenes.
    ///
    /// Intervals keep their declaration order; the first declared interval
    /// overlapping a pattern decides its fate.
    pub fn new(intervals: Vec<IntentInterval>, scene_count: usize) -> Result<Self, AnalysisError> {
        for interval in &intervals {
            let range = interval.scene_range;
            if range.start() == 0 || range.is_empty() || range.end() > scene_count {
                return Err(AnalysisError::InvalidRecord(format!(
                    "intent interval [{}, {}] is outside scenes 1..={}",
                    range.start(),
                    range.end(),
                    scene_count
                )));
            }
        }
        Ok(Self {
            intervals,
            min_remainder: 3,
        })
    }

    /// Minimum scenes an unsuppressed remainder needs to stay surfaced
    pub fn with_min_remainder(mut self, min_remainder: usize) -> Self {
        self.min_remainder = min_remainder;
        self
    }

    pub fn intervals(&self) -> &[IntentInterval] {
        &self.intervals
    }

    /// Split patterns into surfaced and suppressed lists
    pub fn apply(&self, patterns: &[PatternDescriptor]) -> SuppressionOutcome {
        let mut outcome = SuppressionOutcome {
            notes: self.conflicts(),
            ..SuppressionOutcome::default()
        };

        for pattern in patterns {
            let range = pattern.scene_range;
            let covering = self
                .intervals
                .iter()
                .find_map(|interval| interval.scene_range.intersection(&range).map(|o| (interval, o)));

            let Some((interval, overlap)) = covering else {
                outcome.surfaced.push(pattern.clone());
                continue;
            };

            if overlap == range {
                outcome.suppressed.push(pattern.clone());
                outcome.notes.push(SuppressionNote::Suppressed {
                    pattern_type: pattern.pattern_type,
                    intent: interval.intent,
                    scene_range: range,
                });
                continue;
            }

            outcome
                .suppressed
                .push(pattern.narrowed(overlap, pattern.confidence_band()));

            let remainder = if range.start() < interval.scene_range.start() {
                SceneRange(range.start(), interval.scene_range.start() - 1)
            } else {
                SceneRange(interval.scene_range.end() + 1, range.end())
            };
            let kept = (remainder.len() >= self.min_remainder).then_some(remainder);
            if let Some(remainder) = kept {
                outcome
                    .surfaced
                    .push(pattern.narrowed(remainder, ConfidenceBand::Low));
            }
            outcome.notes.push(SuppressionNote::PartialSuppression {
                pattern_type: pattern.pattern_type,
                intent: interval.intent,
                scene_range: overlap,
                remainder: kept,
            });
        }

        debug!(
            intervals = self.intervals.len(),
            surfaced = outcome.surfaced.len(),
            suppressed = outcome.suppressed.len(),
            notes = outcome.notes.len(),
            "writer intents applied"
        );
        outcome
    }

    fn conflicts(&self) -> Vec<SuppressionNote> {
        let mut notes = Vec::new();
        for (i, first) in self.intervals.iter().enumerate() {
            for second in &self.intervals[i + 1..] {
                if first.intent == second.intent {
                    continue;
                }
                if let Some(overlap) = first.scene_range.intersection(&second.scene_range) {
                    notes.push(SuppressionNote::IntentConflict {
                        scene_range: overlap,
                        intents: vec![first.intent, second.intent],
                    });
                }
            }
        }
        notes
    }
}
