//! scene.counts.v1 schema definition
//!
//! Raw, un-normalized counts for one scene:
//! - Linguistic load (sentences and their lengths)
//! - Dialogue turn-taking
//! - Action blocks
//! - Character tracking
//! - Structural change against the previous scene
//!
//! Every count defaults to zero when absent. Negative counts are accepted here
//! and treated as missing by the normalizer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current schema version
pub const SCHEMA_VERSION: &str = "scene.counts.v1";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_segmentation_confidence() -> f64 {
    1.0
}

/// Raw structural counts for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSceneCounts {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Scene heading or upstream identifier, carried for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<String>,

    #[serde(default)]
    pub sentence_count: f64,
    #[serde(default)]
    pub mean_sentence_length: f64,
    #[serde(default)]
    pub sentence_length_variance: f64,

    #[serde(default)]
    pub dialogue_turns: f64,
    #[serde(default)]
    pub speaker_switches: f64,
    /// Dialogue turns per line
    #[serde(default)]
    pub turn_velocity: f64,

    #[serde(default)]
    pub action_line_count: f64,
    #[serde(default)]
    pub continuous_action_runs: f64,

    #[serde(default)]
    pub active_character_count: f64,
    #[serde(default)]
    pub character_reintroductions: f64,

    /// Upstream boundary strength against the previous scene
    #[serde(default)]
    pub event_boundary_score: f64,

    /// Total lines in the scene (zero means an empty scene)
    #[serde(default)]
    pub line_count: u32,
    /// Upstream segmentation confidence (0-1)
    #[serde(default = "default_segmentation_confidence")]
    pub segmentation_confidence: f64,
}

impl RawSceneCounts {
    /// Record with every count zero
    pub fn empty() -> Self {
        Self {
            schema_version: default_schema_version(),
            scene_id: None,
            sentence_count: 0.0,
            mean_sentence_length: 0.0,
            sentence_length_variance: 0.0,
            dialogue_turns: 0.0,
            speaker_switches: 0.0,
            turn_velocity: 0.0,
            action_line_count: 0.0,
            continuous_action_runs: 0.0,
            active_character_count: 0.0,
            character_reintroductions: 0.0,
            event_boundary_score: 0.0,
            line_count: 0,
            segmentation_confidence: default_segmentation_confidence(),
        }
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        let confidence = self.segmentation_confidence;
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::SegmentationConfidenceOutOfRange(confidence));
        }

        Ok(())
    }

    /// The eleven count fields in normalization order
    pub(crate) fn counts(&self) -> [f64; 11] {
        [
            self.sentence_count,
            self.mean_sentence_length,
            self.sentence_length_variance,
            self.dialogue_turns,
            self.speaker_switches,
            self.turn_velocity,
            self.action_line_count,
            self.continuous_action_runs,
            self.active_character_count,
            self.character_reintroductions,
            self.event_boundary_score,
        ]
    }
}

/// Record validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Segmentation confidence {0} is outside [0, 1]")]
    SegmentationConfidenceOutOfRange(f64),
}
