//! Recovery credit
//!
//! Three independent, additive sources, clamped to `[0, max_recovery]`:
//! - low-effort bonus, linear in the gap below the effort threshold
//! - structural-boundary bonus, linear in the boundary delta
//! - flat compression bonus for unusually short (non-empty) scenes

use crate::config::RecoveryConfig;
use crate::types::SceneFeatures;

/// Recovery contributions for one scene before clamping
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecoveryBreakdown {
    pub low_effort: f64,
    pub boundary: f64,
    pub compression: f64,
}

impl RecoveryBreakdown {
    pub fn total(&self) -> f64 {
        self.low_effort + self.boundary + self.compression
    }
}

/// Recovery model with fixed parameters
#[derive(Debug, Clone, Copy)]
pub struct RecoveryModel {
    config: RecoveryConfig,
}

impl RecoveryModel {
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }

    /// Per-source contributions
    pub fn breakdown(&self, effort: f64, features: &SceneFeatures) -> RecoveryBreakdown {
        let cfg = &self.config;

        let low_effort = if effort < cfg.effort_threshold {
            cfg.low_effort_rate * (cfg.effort_threshold - effort)
        } else {
            0.0
        };

        let delta = features.structural_change.event_boundary_score;
        let boundary = if delta > cfg.boundary_threshold {
            cfg.boundary_rate * delta
        } else {
            0.0
        };

        let compression = if features.line_count > 0 && features.line_count < cfg.min_lines {
            cfg.compression_bonus
        } else {
            0.0
        };

        RecoveryBreakdown {
            low_effort,
            boundary,
            compression,
        }
    }

    /// Recovery credit R, clamped to `[0, max_recovery]`
    pub fn credit(&self, effort: f64, features: &SceneFeatures) -> f64 {
        self.breakdown(effort, features)
            .total()
            .clamp(0.0, self.config.max_recovery)
    }
}
