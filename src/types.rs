//! Core types for the ScenePulse pipeline
//!
//! This module defines the records that flow between stages: per-scene feature
//! records, temporal signal records and pattern descriptors. Each stage produces
//! a new sequence; nothing here is revised in place by a later stage.

use crate::summary::SignalSummary;
use crate::suppression::SuppressionOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Linguistic load of a scene (per-document normalized)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinguisticLoad {
    pub sentence_count: f64,
    pub mean_sentence_length: f64,
    pub sentence_length_variance: f64,
}

/// Dialogue turn-taking dynamics (per-document normalized)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueDynamics {
    pub dialogue_turns: f64,
    pub speaker_switches: f64,
    pub turn_velocity: f64,
}

/// Visual/action density (per-document normalized)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualAbstraction {
    pub action_line_count: f64,
    pub continuous_action_runs: f64,
}

/// Character tracking load (per-document normalized)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferentialMemory {
    pub active_character_count: f64,
    pub character_reintroductions: f64,
}

/// Structural change relative to the previous scene (per-document normalized)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralChange {
    pub event_boundary_score: f64,
}

/// Feature record for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFeatures {
    /// 1-based scene position
    pub scene_index: usize,
    #[serde(default)]
    pub linguistic_load: LinguisticLoad,
    #[serde(default)]
    pub dialogue_dynamics: DialogueDynamics,
    #[serde(default)]
    pub visual_abstraction: VisualAbstraction,
    #[serde(default)]
    pub referential_memory: ReferentialMemory,
    #[serde(default)]
    pub structural_change: StructuralChange,
    /// Raw line count of the scene (not normalized)
    #[serde(default)]
    pub line_count: u32,
    /// Upstream segmentation confidence (0-1)
    #[serde(default = "default_segmentation_confidence")]
    pub segmentation_confidence: f64,
}

fn default_segmentation_confidence() -> f64 {
    1.0
}

impl SceneFeatures {
    /// All-zero features for a scene (used when a scene carries no usable data)
    pub fn zeroed(scene_index: usize) -> Self {
        Self {
            scene_index,
            linguistic_load: LinguisticLoad::default(),
            dialogue_dynamics: DialogueDynamics::default(),
            visual_abstraction: VisualAbstraction::default(),
            referential_memory: ReferentialMemory::default(),
            structural_change: StructuralChange::default(),
            line_count: 0,
            segmentation_confidence: default_segmentation_confidence(),
        }
    }

    /// Copy with every non-finite or negative feature replaced by zero.
    ///
    /// Returns the cleaned record and the number of values replaced.
    pub fn sanitized(&self) -> (Self, usize) {
        let mut clean = self.clone();
        let mut replaced = 0;
        for value in clean.values_mut() {
            if !value.is_finite() || *value < 0.0 {
                *value = 0.0;
                replaced += 1;
            }
        }
        let conf = clean.segmentation_confidence;
        if !conf.is_finite() {
            clean.segmentation_confidence = 0.0;
            replaced += 1;
        } else {
            clean.segmentation_confidence = conf.clamp(0.0, 1.0);
        }
        (clean, replaced)
    }

    fn values_mut(&mut self) -> [&mut f64; 11] {
        [
            &mut self.linguistic_load.sentence_count,
            &mut self.linguistic_load.mean_sentence_length,
            &mut self.linguistic_load.sentence_length_variance,
            &mut self.dialogue_dynamics.dialogue_turns,
            &mut self.dialogue_dynamics.speaker_switches,
            &mut self.dialogue_dynamics.turn_velocity,
            &mut self.visual_abstraction.action_line_count,
            &mut self.visual_abstraction.continuous_action_runs,
            &mut self.referential_memory.active_character_count,
            &mut self.referential_memory.character_reintroductions,
            &mut self.structural_change.event_boundary_score,
        ]
    }
}

/// The five feature-group sub-scores of a scene, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProfile {
    pub linguistic: f64,
    pub dialogue: f64,
    pub visual: f64,
    pub referential: f64,
    pub structural: f64,
}

impl FeatureProfile {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.linguistic,
            self.dialogue,
            self.visual,
            self.referential,
            self.structural,
        ]
    }

    /// Cosine similarity; zero when either profile is the zero vector
    pub fn cosine_similarity(&self, other: &FeatureProfile) -> f64 {
        let a = self.as_array();
        let b = other.as_array();
        let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
        let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
            return 0.0;
        }
        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

/// Descriptive fatigue label (ordinal, carries no judgment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueState {
    Normal,
    Elevated,
    High,
    Extreme,
}

impl FatigueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FatigueState::Normal => "normal",
            FatigueState::Elevated => "elevated",
            FatigueState::High => "high",
            FatigueState::Extreme => "extreme",
        }
    }
}

/// Temporal signal for one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSignal {
    pub scene_index: usize,
    /// Instantaneous effort (E)
    pub instantaneous_effort: f64,
    /// Running attentional signal (S)
    pub attentional_signal: f64,
    /// Recovery credit (R)
    pub recovery_credit: f64,
    pub fatigue_state: FatigueState,
}

/// Per-scene side inputs for pattern detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    pub scene_index: usize,
    /// Structural-change delta (event boundary score)
    pub structural_delta: f64,
    /// Upstream segmentation confidence (0-1)
    pub segmentation_confidence: f64,
    pub profile: FeatureProfile,
}

/// Closed set of pattern shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    SustainedDemand,
    LimitedRecovery,
    SequenceRepetition,
    SurpriseCluster,
    ConstructiveStrain,
    DegenerativeFatigue,
}

impl PatternKind {
    /// All kinds in output order
    pub const ALL: [PatternKind; 6] = [
        PatternKind::SustainedDemand,
        PatternKind::LimitedRecovery,
        PatternKind::SequenceRepetition,
        PatternKind::SurpriseCluster,
        PatternKind::ConstructiveStrain,
        PatternKind::DegenerativeFatigue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::SustainedDemand => "sustained-demand",
            PatternKind::LimitedRecovery => "limited-recovery",
            PatternKind::SequenceRepetition => "sequence-repetition",
            PatternKind::SurpriseCluster => "surprise-cluster",
            PatternKind::ConstructiveStrain => "constructive-strain",
            PatternKind::DegenerativeFatigue => "degenerative-fatigue",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence band, ordered `Low < Medium < High`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    /// The lower of the current band and a proposed one.
    ///
    /// This is the only way a band changes after detection.
    #[must_use]
    pub fn capped_at(self, proposed: ConfidenceBand) -> ConfidenceBand {
        self.min(proposed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::Low => "low",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::High => "high",
        }
    }
}

/// Inclusive scene range `[start, end]` (1-based scene indices)
///
/// Serializes as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneRange(pub usize, pub usize);

impl SceneRange {
    pub fn start(&self) -> usize {
        self.0
    }

    pub fn end(&self) -> usize {
        self.1
    }

    /// Number of scenes covered
    pub fn len(&self) -> usize {
        if self.1 < self.0 {
            0
        } else {
            self.1 - self.0 + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overlapping part of two ranges, if any
    pub fn intersection(&self, other: &SceneRange) -> Option<SceneRange> {
        let start = self.0.max(other.0);
        let end = self.1.min(other.1);
        (start <= end).then_some(SceneRange(start, end))
    }
}

/// Named aggregate statistics backing a pattern (ordered for stable output)
pub type SupportingMetrics = BTreeMap<String, f64>;

/// A detected pattern over a contiguous scene range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDescriptor {
    pub pattern_type: PatternKind,
    pub scene_range: SceneRange,
    confidence_band: ConfidenceBand,
    pub supporting_metrics: SupportingMetrics,
}

impl PatternDescriptor {
    pub(crate) fn new(
        pattern_type: PatternKind,
        scene_range: SceneRange,
        confidence_band: ConfidenceBand,
        supporting_metrics: SupportingMetrics,
    ) -> Self {
        Self {
            pattern_type,
            scene_range,
            confidence_band,
            supporting_metrics,
        }
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        self.confidence_band
    }

    /// New descriptor whose band is `min(current, proposed)`
    #[must_use]
    pub fn downgraded(&self, proposed: ConfidenceBand) -> Self {
        Self {
            confidence_band: self.confidence_band.capped_at(proposed),
            ..self.clone()
        }
    }

    /// New descriptor restricted to `range`, with its band capped at `cap`.
    ///
    /// Statistics of the source range do not carry over; the descriptor keeps
    /// its own scene count and the bounds of the range it was cut from.
    #[must_use]
    pub fn narrowed(&self, range: SceneRange, cap: ConfidenceBand) -> Self {
        let mut supporting_metrics = SupportingMetrics::new();
        supporting_metrics.insert("scene_count".to_string(), range.len() as f64);
        supporting_metrics.insert("source_start".to_string(), self.scene_range.start() as f64);
        supporting_metrics.insert("source_end".to_string(), self.scene_range.end() as f64);
        Self {
            pattern_type: self.pattern_type,
            scene_range: range,
            confidence_band: self.confidence_band.capped_at(cap),
            supporting_metrics,
        }
    }
}

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub config_version: String,
    pub schema_version: String,
    pub scene_count: usize,
    pub computed_at_utc: String,
}

/// Complete analysis payload for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub summary: SignalSummary,
    pub signals: Vec<TemporalSignal>,
    pub patterns: Vec<PatternDescriptor>,
    /// Present only when writer intents were applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppression: Option<SuppressionOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_ordering() {
        assert!(ConfidenceBand::Low < ConfidenceBand::Medium);
        assert!(ConfidenceBand::Medium < ConfidenceBand::High);
        assert_eq!(
            ConfidenceBand::Medium.capped_at(ConfidenceBand::High),
            ConfidenceBand::Medium
        );
        assert_eq!(
            ConfidenceBand::High.capped_at(ConfidenceBand::Low),
            ConfidenceBand::Low
        );
    }

    #[test]
    fn test_downgrade_never_upgrades() {
        let pattern = PatternDescriptor::new(
            PatternKind::SustainedDemand,
            SceneRange(4, 9),
            ConfidenceBand::Medium,
            SupportingMetrics::new(),
        );
        let attempted = pattern.downgraded(ConfidenceBand::High);
        assert_eq!(attempted.confidence_band(), ConfidenceBand::Medium);
        let lowered = pattern.downgraded(ConfidenceBand::Low);
        assert_eq!(lowered.confidence_band(), ConfidenceBand::Low);
        // Original is untouched
        assert_eq!(pattern.confidence_band(), ConfidenceBand::Medium);
    }

    #[test]
    fn test_narrowed_drops_source_statistics() {
        let mut metrics = SupportingMetrics::new();
        metrics.insert("scene_count".to_string(), 11.0);
        metrics.insert("mean_signal".to_string(), 2.4);
        metrics.insert("tier_agreement".to_string(), 3.0);
        let pattern = PatternDescriptor::new(
            PatternKind::SustainedDemand,
            SceneRange(4, 14),
            ConfidenceBand::High,
            metrics,
        );

        let part = pattern.narrowed(SceneRange(4, 9), ConfidenceBand::Low);
        assert_eq!(part.scene_range, SceneRange(4, 9));
        assert_eq!(part.confidence_band(), ConfidenceBand::Low);
        assert_eq!(part.supporting_metrics["scene_count"], 6.0);
        assert_eq!(part.supporting_metrics["source_start"], 4.0);
        assert_eq!(part.supporting_metrics["source_end"], 14.0);
        assert!(!part.supporting_metrics.contains_key("mean_signal"));
        assert!(!part.supporting_metrics.contains_key("tier_agreement"));
    }

    #[test]
    fn test_scene_range() {
        let range = SceneRange(3, 7);
        assert_eq!(range.len(), 5);
        assert_eq!(range.intersection(&SceneRange(6, 10)), Some(SceneRange(6, 7)));
        assert_eq!(range.intersection(&SceneRange(8, 10)), None);
    }

    #[test]
    fn test_pattern_serialization_shape() {
        let mut metrics = SupportingMetrics::new();
        metrics.insert("scene_count".to_string(), 5.0);
        let pattern = PatternDescriptor::new(
            PatternKind::DegenerativeFatigue,
            SceneRange(10, 14),
            ConfidenceBand::High,
            metrics,
        );

        let json = serde_json::to_value(&pattern).unwrap();
        assert_eq!(json["pattern_type"], "degenerative-fatigue");
        assert_eq!(json["scene_range"], serde_json::json!([10, 14]));
        assert_eq!(json["confidence_band"], "high");
        assert_eq!(json["supporting_metrics"]["scene_count"], 5.0);
    }

    #[test]
    fn test_sanitize_replaces_bad_values() {
        let mut features = SceneFeatures::zeroed(1);
        features.linguistic_load.sentence_count = f64::NAN;
        features.dialogue_dynamics.dialogue_turns = -2.0;
        features.visual_abstraction.action_line_count = 0.4;
        features.segmentation_confidence = 1.7;

        let (clean, replaced) = features.sanitized();
        assert_eq!(replaced, 2);
        assert_eq!(clean.linguistic_load.sentence_count, 0.0);
        assert_eq!(clean.dialogue_dynamics.dialogue_turns, 0.0);
        assert_eq!(clean.visual_abstraction.action_line_count, 0.4);
        assert_eq!(clean.segmentation_confidence, 1.0);
    }

    #[test]
    fn test_missing_groups_deserialize_to_zero() {
        let features: SceneFeatures = serde_json::from_str(r#"{"scene_index": 2}"#).unwrap();
        assert_eq!(features, SceneFeatures::zeroed(2));
    }

    #[test]
    fn test_cosine_of_zero_profile() {
        let zero = FeatureProfile::default();
        let other = FeatureProfile {
            linguistic: 0.5,
            ..Default::default()
        };
        assert_eq!(zero.cosine_similarity(&other), 0.0);
        assert!((other.cosine_similarity(&other) - 1.0).abs() < 1e-12);
    }
}
