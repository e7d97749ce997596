//! Per-document feature normalization
//!
//! This module turns raw scene counts into scene feature records.
//! - Every count is min–max scaled against the document's own distribution
//! - Constant fields map to zero
//! - Empty scenes (zero lines) get all-zero features and do not shape the distribution
//! - Non-finite or negative counts are treated as missing (zero)

use crate::schema::RawSceneCounts;
use crate::types::{
    DialogueDynamics, LinguisticLoad, ReferentialMemory, SceneFeatures, StructuralChange,
    VisualAbstraction,
};
use tracing::{debug, warn};

const FIELD_COUNT: usize = 11;

/// Normalizer for converting raw counts to scene feature records
pub struct DocumentNormalizer;

impl DocumentNormalizer {
    /// Normalize a whole document. Scene indices are assigned 1..=n in input order.
    pub fn normalize(records: &[RawSceneCounts]) -> Vec<SceneFeatures> {
        let cleaned: Vec<[f64; FIELD_COUNT]> = records
            .iter()
            .enumerate()
            .map(|(i, record)| clean_counts(i + 1, record))
            .collect();

        let ranges = field_ranges(records, &cleaned);
        let empty_scenes = records.iter().filter(|r| r.line_count == 0).count();

        let features: Vec<SceneFeatures> = records
            .iter()
            .zip(cleaned.iter())
            .enumerate()
            .map(|(i, (record, counts))| {
                let scene_index = i + 1;
                let mut features = SceneFeatures::zeroed(scene_index);
                features.line_count = record.line_count;
                features.segmentation_confidence = if record.segmentation_confidence.is_finite() {
                    record.segmentation_confidence.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                if record.line_count == 0 {
                    return features;
                }

                let mut scaled = [0.0; FIELD_COUNT];
                for (field, value) in counts.iter().enumerate() {
                    scaled[field] = scale(*value, ranges[field]);
                }
                if scene_index == 1 {
                    scaled[10] = 0.0;
                }
                assign(&mut features, scaled);
                features
            })
            .collect();

        debug!(
            scenes = features.len(),
            empty_scenes, "document normalized"
        );
        features
    }
}

fn clean_counts(scene_index: usize, record: &RawSceneCounts) -> [f64; FIELD_COUNT] {
    let mut counts = record.counts();
    let mut replaced = 0;
    for value in counts.iter_mut() {
        if !value.is_finite() || *value < 0.0 {
            *value = 0.0;
            replaced += 1;
        }
    }
    if replaced > 0 {
        warn!(scene = scene_index, replaced, "missing or invalid counts treated as zero");
    }
    counts
}

/// (min, max) per field over non-empty scenes
fn field_ranges(records: &[RawSceneCounts], cleaned: &[[f64; FIELD_COUNT]]) -> [(f64, f64); FIELD_COUNT] {
    let mut ranges = [(f64::INFINITY, f64::NEG_INFINITY); FIELD_COUNT];
    for (record, counts) in records.iter().zip(cleaned.iter()) {
        if record.line_count == 0 {
            continue;
        }
        for (range, value) in ranges.iter_mut().zip(counts.iter()) {
            range.0 = range.0.min(*value);
            range.1 = range.1.max(*value);
        }
    }
    ranges
}

fn scale(value: f64, (min, max): (f64, f64)) -> f64 {
    let span = max - min;
    if !span.is_finite() || span <= f64::EPSILON {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

fn assign(features: &mut SceneFeatures, scaled: [f64; FIELD_COUNT]) {
    features.linguistic_load = LinguisticLoad {
        sentence_count: scaled[0],
        mean_sentence_length: scaled[1],
        sentence_length_variance: scaled[2],
    };
    features.dialogue_dynamics = DialogueDynamics {
        dialogue_turns: scaled[3],
        speaker_switches: scaled[4],
        turn_velocity: scaled[5],
    };
    features.visual_abstraction = VisualAbstraction {
        action_line_count: scaled[6],
        continuous_action_runs: scaled[7],
    };
    features.referential_memory = ReferentialMemory {
        active_character_count: scaled[8],
        character_reintroductions: scaled[9],
    };
    features.structural_change = StructuralChange {
        event_boundary_score: scaled[10],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sentences: f64, boundary: f64, lines: u32) -> RawSceneCounts {
        RawSceneCounts {
            sentence_count: sentences,
            event_boundary_score: boundary,
            line_count: lines,
            ..RawSceneCounts::empty()
        }
    }

    #[test]
    fn test_min_max_scaling() {
        let records = vec![
            record(10.0, 0.0, 20),
            record(20.0, 0.5, 20),
            record(30.0, 1.0, 20),
        ];
        let features = DocumentNormalizer::normalize(&records);

        assert_eq!(features.len(), 3);
        assert_eq!(features[0].linguistic_load.sentence_count, 0.0);
        assert!((features[1].linguistic_load.sentence_count - 0.5).abs() < 1e-12);
        assert_eq!(features[2].linguistic_load.sentence_count, 1.0);
        assert_eq!(features[2].structural_change.event_boundary_score, 1.0);
    }

    #[test]
    fn test_constant_field_maps_to_zero() {
        let records = vec![record(7.0, 0.0, 10), record(7.0, 0.0, 10)];
        let features = DocumentNormalizer::normalize(&records);
        assert!(features
            .iter()
            .all(|f| f.linguistic_load.sentence_count == 0.0));
    }

    #[test]
    fn test_first_scene_boundary_is_zero() {
        let records = vec![record(1.0, 0.9, 10), record(2.0, 0.1, 10)];
        let features = DocumentNormalizer::normalize(&records);
        assert_eq!(features[0].structural_change.event_boundary_score, 0.0);
    }

    #[test]
    fn test_empty_scene_is_zeroed_and_ignored() {
        let records = vec![
            record(10.0, 0.0, 20),
            record(500.0, 0.0, 0),
            record(30.0, 0.0, 20),
        ];
        let features = DocumentNormalizer::normalize(&records);
        assert_eq!(features[1], SceneFeatures::zeroed(2));
        // The empty scene's count does not stretch the range
        assert_eq!(features[2].linguistic_load.sentence_count, 1.0);
    }

    #[test]
    fn test_invalid_counts_become_zero() {
        let records = vec![record(-4.0, 0.0, 10), record(8.0, 0.0, 10), record(4.0, 0.0, 10)];
        let features = DocumentNormalizer::normalize(&records);
        assert_eq!(features[0].linguistic_load.sentence_count, 0.0);
        assert!((features[2].linguistic_load.sentence_count - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_indices_reassigned_in_order() {
        let mut first = record(1.0, 0.0, 5);
        first.scene_id = Some("12A".to_string());
        let features = DocumentNormalizer::normalize(&[first, record(2.0, 0.0, 5)]);
        assert_eq!(features[0].scene_index, 1);
        assert_eq!(features[1].scene_index, 2);
        assert_eq!(features[0].line_count, 5);
    }
}
