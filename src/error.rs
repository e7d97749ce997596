//! Error types for ScenePulse

use thiserror::Error;

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to parse scene payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid scene record: {0}")]
    InvalidRecord(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scene order violation: expected scene {expected}, found {found}")]
    SceneOrder { expected: usize, found: usize },

    #[error("Side input length mismatch: {signals} signals, {contexts} scene contexts")]
    LengthMismatch { signals: usize, contexts: usize },

    #[error("Non-finite {quantity} at scene {scene_index}")]
    NonFinite {
        scene_index: usize,
        quantity: &'static str,
    },

    #[error("Analysis cancelled at scene {scene_index}")]
    Cancelled { scene_index: usize },

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
