//! ScenePulse - Deterministic reader-load dynamics for screenplays
//!
//! ScenePulse turns per-scene structural counts into an explainable time series
//! of how much processing demand a single-pass reader accumulates, then marks
//! persistent shapes over that series: schema adaptation → normalization →
//! temporal dynamics → pattern detection → report encoding.
//!
//! ## Modules
//!
//! - **Temporal Dynamics**: effort, recovery, bounded attentional signal and fatigue state per scene
//! - **Pattern Detection**: multi-window confirmed patterns with ordered confidence bands
//! - **Suppression**: writer-intent filtering that can only lower confidence
//!
//! Nothing here judges quality or meaning; every input is an observable count.

pub mod config;
pub mod effort;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod patterns;
pub mod pipeline;
pub mod schema;
pub mod summary;
pub mod suppression;
pub mod temporal;
pub mod types;

pub use config::EngineConfig;
pub use error::AnalysisError;
pub use patterns::PatternDetector;
pub use pipeline::{analyze_document, PulseProcessor};
pub use temporal::TemporalEngine;

// Schema exports
pub use schema::{RawSceneCounts, SceneCountsAdapter, SCHEMA_VERSION};

// Suppression exports
pub use suppression::{IntentInterval, IntentSuppressor, WriterIntent};

/// Engine version embedded in all reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "scenepulse";
