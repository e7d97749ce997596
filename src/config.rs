//! Engine configuration
//!
//! Every constant the temporal and pattern engines read lives here. A
//! configuration is immutable once handed to an engine; changing any value is a
//! new configuration version and outputs computed under different versions are
//! not comparable.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Version tag for the default configuration
pub const DEFAULT_CONFIG_VERSION: &str = "pulse-config-1";

/// Tolerance used when checking that effort weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Complete, versioned configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Configuration version carried into every report
    pub version: String,
    /// Base fatigue carryover coefficient (λ)
    pub lambda: f64,
    pub effort_weights: EffortWeights,
    pub recovery: RecoveryConfig,
    pub wall: FatigueWallConfig,
    pub buffers: BufferConfig,
    pub fatigue: FatigueThresholds,
    pub length: LengthNormalization,
    pub patterns: PatternThresholds,
    pub windows: WindowTiers,
    pub confidence: ConfidenceThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            lambda: 0.85,
            effort_weights: EffortWeights::default(),
            recovery: RecoveryConfig::default(),
            wall: FatigueWallConfig::default(),
            buffers: BufferConfig::default(),
            fatigue: FatigueThresholds::default(),
            length: LengthNormalization::default(),
            patterns: PatternThresholds::default(),
            windows: WindowTiers::default(),
            confidence: ConfidenceThresholds::default(),
        }
    }
}

/// Fixed weights for the five feature-group sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortWeights {
    pub linguistic: f64,
    pub dialogue: f64,
    pub visual: f64,
    pub referential: f64,
    pub structural: f64,
}

impl Default for EffortWeights {
    fn default() -> Self {
        Self {
            linguistic: 0.25,
            dialogue: 0.20,
            visual: 0.20,
            referential: 0.20,
            structural: 0.15,
        }
    }
}

impl EffortWeights {
    /// Weights in feature-group order
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.linguistic,
            self.dialogue,
            self.visual,
            self.referential,
            self.structural,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// Recovery credit parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Effort below which the low-effort bonus applies
    pub effort_threshold: f64,
    /// Low-effort bonus rate (β)
    pub low_effort_rate: f64,
    /// Structural delta above which the boundary bonus applies
    pub boundary_threshold: f64,
    /// Boundary bonus rate (γ)
    pub boundary_rate: f64,
    /// Scenes with fewer lines than this earn the compression bonus
    pub min_lines: u32,
    /// Flat compression bonus (δ)
    pub compression_bonus: f64,
    /// Recovery cap per scene
    pub max_recovery: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            effort_threshold: 0.4,
            low_effort_rate: 0.3,
            boundary_threshold: 0.3,
            boundary_rate: 0.2,
            min_lines: 4,
            compression_bonus: 0.25,
            max_recovery: 0.5,
        }
    }
}

/// Nonlinear fatigue wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueWallConfig {
    /// Signal level above which the quadratic penalty applies
    pub ceiling: f64,
    /// Quadratic coefficient (α)
    pub coefficient: f64,
    /// Largest excess over the ceiling that is squared
    pub excess_span: f64,
}

impl Default for FatigueWallConfig {
    fn default() -> Self {
        Self {
            ceiling: 2.0,
            coefficient: 0.15,
            excess_span: 1.5,
        }
    }
}

impl FatigueWallConfig {
    /// Largest penalty a single scene can receive
    pub fn max_penalty(&self) -> f64 {
        self.coefficient * self.excess_span * self.excess_span
    }
}

/// Opening and ending carryover buffers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Number of scenes over which carryover ramps up from zero
    pub opening_scenes: usize,
    /// Fraction of the document (from the end) with reduced carryover
    pub ending_fraction: f64,
    /// Carryover multiplier reached at the final scene
    pub ending_floor: f64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            opening_scenes: 3,
            ending_fraction: 0.1,
            ending_floor: 0.5,
        }
    }
}

/// Base fatigue-state thresholds for a standard-length document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueThresholds {
    pub elevated: f64,
    pub high: f64,
    pub extreme: f64,
}

impl Default for FatigueThresholds {
    fn default() -> Self {
        Self {
            elevated: 0.5,
            high: 1.0,
            extreme: 1.5,
        }
    }
}

/// Length normalization of signal thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthNormalization {
    /// Documents with at least this many scenes use unscaled thresholds
    pub standard_scenes: usize,
    /// Documents below this many scenes use `short_factor`
    pub short_scenes: usize,
    /// Factor at `short_scenes` (interpolated down to 1.0 at `standard_scenes`)
    pub mid_factor: f64,
    /// Factor for very short documents
    pub short_factor: f64,
}

impl Default for LengthNormalization {
    fn default() -> Self {
        Self {
            standard_scenes: 50,
            short_scenes: 20,
            mid_factor: 1.5,
            short_factor: 2.0,
        }
    }
}

/// Thresholds for the six pattern shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternThresholds {
    /// Minimum scenes any pattern must span
    pub min_persistence: usize,
    /// Signal level considered elevated (scaled by length factor)
    pub elevated_signal: f64,
    /// Signal baseline for limited recovery (scaled by length factor)
    pub baseline_signal: f64,
    /// Recovery below this counts as limited
    pub low_recovery: f64,
    /// Repetition period in scenes
    pub repetition_period: usize,
    /// Minimum cosine similarity between a scene and the one a period earlier
    pub repetition_similarity: f64,
    /// Minimum number of periods a repetition must cover
    pub repetition_min_periods: usize,
    /// Structural delta counted as a surprise
    pub surprise_delta: f64,
    /// Share of surprising scenes a window needs
    pub surprise_ratio: f64,
    /// Smallest window for surprise clusters
    pub surprise_min_window: usize,
    /// Mean recovery that marks strain as counterbalanced
    pub constructive_recovery: f64,
    /// Mean structural delta that marks strain as progressing
    pub constructive_progression: f64,
    /// Minimum least-squares slope of the signal (per scene)
    pub degenerative_slope: f64,
    /// Mean recovery below which accumulation is uncounterbalanced
    pub degenerative_recovery: f64,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            min_persistence: 3,
            elevated_signal: 0.6,
            baseline_signal: 0.3,
            low_recovery: 0.05,
            repetition_period: 2,
            repetition_similarity: 0.95,
            repetition_min_periods: 3,
            surprise_delta: 0.5,
            surprise_ratio: 0.6,
            surprise_min_window: 5,
            constructive_recovery: 0.15,
            constructive_progression: 0.3,
            degenerative_slope: 0.02,
            degenerative_recovery: 0.1,
        }
    }
}

/// Window sizes for the three agreement tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowTiers {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
    /// Tiers that must agree before a scene is confirmed
    pub required_agreement: usize,
}

impl Default for WindowTiers {
    fn default() -> Self {
        Self {
            short: 3,
            medium: 7,
            long: 15,
            required_agreement: 2,
        }
    }
}

impl WindowTiers {
    pub fn as_array(&self) -> [usize; 3] {
        [self.short, self.medium, self.long]
    }
}

/// Confidence band thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub high_persistence: usize,
    pub medium_persistence: usize,
    /// Residual variation (std around trend / mean) allowed for high
    pub high_variation: f64,
    pub medium_variation: f64,
    /// Mean segmentation confidence required for high
    pub high_upstream: f64,
    pub medium_upstream: f64,
    /// Documents with signal contrast below this cap bands at medium
    pub low_contrast: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high_persistence: 8,
            medium_persistence: 5,
            high_variation: 0.15,
            medium_variation: 0.35,
            high_upstream: 0.8,
            medium_upstream: 0.5,
            low_contrast: 0.8,
        }
    }
}

impl EngineConfig {
    /// Upper bound on the attentional signal for any input.
    ///
    /// Effort is at most 1.0, carryover at most λ and the wall adds at most
    /// `α·span²`, so `S ≤ (1 + α·span²) / (1 − λ)` holds by induction.
    pub fn signal_upper_bound(&self) -> f64 {
        (1.0 + self.wall.max_penalty()) / (1.0 - self.lambda)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let finite = [
            ("lambda", self.lambda),
            ("recovery.effort_threshold", self.recovery.effort_threshold),
            ("recovery.low_effort_rate", self.recovery.low_effort_rate),
            ("recovery.boundary_threshold", self.recovery.boundary_threshold),
            ("recovery.boundary_rate", self.recovery.boundary_rate),
            ("recovery.compression_bonus", self.recovery.compression_bonus),
            ("recovery.max_recovery", self.recovery.max_recovery),
            ("wall.ceiling", self.wall.ceiling),
            ("wall.coefficient", self.wall.coefficient),
            ("wall.excess_span", self.wall.excess_span),
            ("buffers.ending_fraction", self.buffers.ending_fraction),
            ("buffers.ending_floor", self.buffers.ending_floor),
            ("fatigue.elevated", self.fatigue.elevated),
            ("fatigue.high", self.fatigue.high),
            ("fatigue.extreme", self.fatigue.extreme),
            ("length.mid_factor", self.length.mid_factor),
            ("length.short_factor", self.length.short_factor),
            ("patterns.elevated_signal", self.patterns.elevated_signal),
            ("patterns.baseline_signal", self.patterns.baseline_signal),
            ("patterns.low_recovery", self.patterns.low_recovery),
            ("patterns.repetition_similarity", self.patterns.repetition_similarity),
            ("patterns.surprise_delta", self.patterns.surprise_delta),
            ("patterns.surprise_ratio", self.patterns.surprise_ratio),
            ("patterns.constructive_recovery", self.patterns.constructive_recovery),
            ("patterns.constructive_progression", self.patterns.constructive_progression),
            ("patterns.degenerative_slope", self.patterns.degenerative_slope),
            ("patterns.degenerative_recovery", self.patterns.degenerative_recovery),
            ("confidence.high_variation", self.confidence.high_variation),
            ("confidence.medium_variation", self.confidence.medium_variation),
            ("confidence.high_upstream", self.confidence.high_upstream),
            ("confidence.medium_upstream", self.confidence.medium_upstream),
            ("confidence.low_contrast", self.confidence.low_contrast),
        ];
        for (name, value) in finite {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be finite and >= 0, got {value}")));
            }
        }
        for (i, w) in self.effort_weights.as_array().iter().enumerate() {
            if !w.is_finite() || *w < 0.0 {
                return Err(invalid(format!("effort weight {i} must be finite and >= 0")));
            }
        }

        if self.version.trim().is_empty() {
            return Err(invalid("version must not be empty"));
        }
        if !(self.lambda > 0.0 && self.lambda < 1.0) {
            return Err(invalid("lambda must be in (0, 1)"));
        }
        let weight_sum = self.effort_weights.sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(invalid(format!(
                "effort weights must sum to 1.0, got {weight_sum}"
            )));
        }
        if self.buffers.ending_fraction > 1.0 {
            return Err(invalid("buffers.ending_fraction must be in [0, 1]"));
        }
        if self.buffers.ending_floor > 1.0 {
            return Err(invalid("buffers.ending_floor must be in [0, 1]"));
        }
        if !(self.fatigue.elevated < self.fatigue.high && self.fatigue.high < self.fatigue.extreme)
        {
            return Err(invalid("fatigue thresholds must be strictly increasing"));
        }
        if self.length.short_scenes >= self.length.standard_scenes {
            return Err(invalid("length.short_scenes must be below standard_scenes"));
        }
        if self.patterns.min_persistence < 3 {
            return Err(invalid("patterns.min_persistence must be at least 3"));
        }
        if self.patterns.repetition_period == 0 {
            return Err(invalid("patterns.repetition_period must be > 0"));
        }
        if self.patterns.surprise_ratio > 1.0 {
            return Err(invalid("patterns.surprise_ratio must be in [0, 1]"));
        }
        let tiers = self.windows;
        if !(tiers.short >= 1 && tiers.short < tiers.medium && tiers.medium < tiers.long) {
            return Err(invalid("window tiers must satisfy 1 <= short < medium < long"));
        }
        if !(2..=3).contains(&tiers.required_agreement) {
            return Err(invalid("windows.required_agreement must be 2 or 3"));
        }
        let conf = self.confidence;
        if conf.medium_persistence > conf.high_persistence {
            return Err(invalid("confidence persistence thresholds out of order"));
        }
        if conf.high_variation > conf.medium_variation {
            return Err(invalid("confidence variation thresholds out of order"));
        }
        if conf.medium_upstream > conf.high_upstream {
            return Err(invalid("confidence upstream thresholds out of order"));
        }
        Ok(())
    }

    /// Load a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(self).map_err(AnalysisError::JsonError)
    }
}

fn invalid(message: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidConfig(message.into())
}
