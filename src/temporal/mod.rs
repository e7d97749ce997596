//! Temporal dynamics
//!
//! Transforms ordered scene feature records into the temporal signal sequence:
//! effort → recovery → accumulation (with buffers and fatigue wall) → fatigue
//! state. Scenes are processed strictly in index order with no look-ahead.

mod accumulator;
mod recovery;
mod state;

pub use accumulator::{apply_fatigue_wall, SignalAccumulator};
pub use recovery::{RecoveryBreakdown, RecoveryModel};
pub use state::{length_factor, FatigueClassifier};

use crate::config::EngineConfig;
use crate::effort::EffortModel;
use crate::error::AnalysisError;
use crate::types::{SceneContext, SceneFeatures, TemporalSignal};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace, warn};

/// Temporal dynamics engine bound to one immutable configuration
#[derive(Debug, Clone)]
pub struct TemporalEngine {
    config: EngineConfig,
    effort: EffortModel,
    recovery: RecoveryModel,
}

impl TemporalEngine {
    /// Create an engine, validating the configuration
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: EngineConfig) -> Self {
        Self {
            effort: EffortModel::new(config.effort_weights),
            recovery: RecoveryModel::new(config.recovery),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the temporal signal for every scene
    pub fn process(&self, features: &[SceneFeatures]) -> Result<Vec<TemporalSignal>, AnalysisError> {
        self.run(features, None)
    }

    /// Like [`process`](Self::process), checking `cancel` before each scene
    pub fn process_cancellable(
        &self,
        features: &[SceneFeatures],
        cancel: &AtomicBool,
    ) -> Result<Vec<TemporalSignal>, AnalysisError> {
        self.run(features, Some(cancel))
    }

    /// Pattern-detection side inputs derived from the same cleaned features
    pub fn scene_contexts(&self, features: &[SceneFeatures]) -> Vec<SceneContext> {
        features
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                let clean = clean_scene(i, scene);
                SceneContext {
                    scene_index: clean.scene_index,
                    structural_delta: clean.structural_change.event_boundary_score,
                    segmentation_confidence: clean.segmentation_confidence,
                    profile: EffortModel::profile(&clean),
                }
            })
            .collect()
    }

    fn run(
        &self,
        features: &[SceneFeatures],
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<TemporalSignal>, AnalysisError> {
        let total_scenes = features.len();
        if total_scenes == 0 {
            return Ok(Vec::new());
        }

        let factor = length_factor(total_scenes, &self.config.length);
        let classifier = FatigueClassifier::new(&self.config.fatigue, factor);
        let mut accumulator = SignalAccumulator::new(&self.config, total_scenes);
        let mut signals = Vec::with_capacity(total_scenes);

        for (i, scene) in features.iter().enumerate() {
            let expected = i + 1;
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(AnalysisError::Cancelled {
                    scene_index: expected,
                });
            }
            if scene.scene_index != expected {
                return Err(AnalysisError::SceneOrder {
                    expected,
                    found: scene.scene_index,
                });
            }

            let clean = clean_scene(i, scene);
            let profile = EffortModel::profile(&clean);
            let effort = ensure_finite(self.effort.effort(&profile), expected, "effort")?;
            let recovery = ensure_finite(
                self.recovery.credit(effort, &clean),
                expected,
                "recovery credit",
            )?;
            let signal = ensure_finite(
                accumulator.push(effort, recovery),
                expected,
                "attentional signal",
            )?;
            let fatigue_state = classifier.classify(signal);

            trace!(
                scene = expected,
                effort,
                recovery,
                signal,
                state = fatigue_state.as_str(),
                "temporal step"
            );

            signals.push(TemporalSignal {
                scene_index: expected,
                instantaneous_effort: effort,
                attentional_signal: signal,
                recovery_credit: recovery,
                fatigue_state,
            });
        }

        debug!(
            scenes = total_scenes,
            length_factor = factor,
            config_version = %self.config.version,
            "temporal signal computed"
        );
        Ok(signals)
    }
}

/// Sanitize a scene's features; scene 1 never carries a boundary delta
fn clean_scene(position: usize, scene: &SceneFeatures) -> SceneFeatures {
    let (mut clean, replaced) = scene.sanitized();
    if replaced > 0 {
        warn!(
            scene = scene.scene_index,
            replaced, "malformed feature values replaced with zero"
        );
    }
    if position == 0 && clean.structural_change.event_boundary_score != 0.0 {
        warn!("first scene carried a boundary delta; treating it as zero");
        clean.structural_change.event_boundary_score = 0.0;
    }
    clean
}

fn ensure_finite(value: f64, scene_index: usize, quantity: &'static str) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NonFinite {
            scene_index,
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FatigueState;
    use pretty_assertions::assert_eq;

    fn scene(index: usize, level: f64) -> SceneFeatures {
        let mut features = SceneFeatures::zeroed(index);
        features.linguistic_load.sentence_count = level;
        features.linguistic_load.mean_sentence_length = level;
        features.linguistic_load.sentence_length_variance = level;
        features.dialogue_dynamics.dialogue_turns = level;
        features.dialogue_dynamics.speaker_switches = level;
        features.dialogue_dynamics.turn_velocity = level;
        features.visual_abstraction.action_line_count = level;
        features.visual_abstraction.continuous_action_runs = level;
        features.referential_memory.active_character_count = level;
        features.referential_memory.character_reintroductions = level;
        features.line_count = 20;
        features
    }

    fn uniform(count: usize, level: f64) -> Vec<SceneFeatures> {
        (1..=count).map(|i| scene(i, level)).collect()
    }

    #[test]
    fn test_one_signal_per_scene() {
        let engine = TemporalEngine::new(EngineConfig::default()).unwrap();
        let signals = engine.process(&uniform(12, 0.5)).unwrap();
        assert_eq!(signals.len(), 12);
        for (i, signal) in signals.iter().enumerate() {
            assert_eq!(signal.scene_index, i + 1);
        }
    }

    #[test]
    fn test_first_scene_base_case() {
        let engine = TemporalEngine::new(EngineConfig::default()).unwrap();
        let mut features = uniform(5, 0.7);
        features[0].structural_change.event_boundary_score = 0.9;
        let signals = engine.process(&features).unwrap();
        assert_eq!(signals[0].attentional_signal, signals[0].instantaneous_effort);

        // The stray boundary on scene 1 is discarded
        let contexts = engine.scene_contexts(&features);
        assert_eq!(contexts[0].structural_delta, 0.0);
    }

    #[test]
    fn test_canonical_recurrence() {
        let config = EngineConfig::default();
        let engine = TemporalEngine::new(config.clone()).unwrap();
        let features = uniform(60, 0.6);
        let signals = engine.process(&features).unwrap();

        // Scene 10 is outside both buffers: S = E + λ·S_prev − R
        let prev = signals[8].attentional_signal;
        let cur = &signals[9];
        let raw = cur.instantaneous_effort + config.lambda * prev - cur.recovery_credit;
        let expected = apply_fatigue_wall(raw.max(0.0), &config.wall);
        assert!((cur.attentional_signal - expected).abs() < 1e-12);
    }

    #[test]
    fn test_scene_order_is_enforced() {
        let engine = TemporalEngine::new(EngineConfig::default()).unwrap();
        let mut features = uniform(4, 0.3);
        features[2].scene_index = 7;
        let err = engine.process(&features).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::SceneOrder {
                expected: 3,
                found: 7
            }
        ));
    }

    #[test]
    fn test_malformed_scene_defaults_to_zero() {
        let engine = TemporalEngine::new(EngineConfig::default()).unwrap();
        let mut features = uniform(4, 0.3);
        features[1].linguistic_load.sentence_count = f64::NAN;
        features[1].dialogue_dynamics.dialogue_turns = f64::INFINITY;

        let signals = engine.process(&features).unwrap();
        assert!(signals
            .iter()
            .all(|s| s.attentional_signal.is_finite() && s.instantaneous_effort.is_finite()));
    }

    #[test]
    fn test_cancellation_reports_scene() {
        let engine = TemporalEngine::new(EngineConfig::default()).unwrap();
        let cancel = AtomicBool::new(true);
        let err = engine
            .process_cancellable(&uniform(4, 0.3), &cancel)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled { scene_index: 1 }));

        let idle = AtomicBool::new(false);
        assert_eq!(
            engine.process_cancellable(&uniform(4, 0.3), &idle).unwrap(),
            engine.process(&uniform(4, 0.3)).unwrap()
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.effort_weights.linguistic = 0.9;
        assert!(TemporalEngine::new(config).is_err());
    }

    #[test]
    fn test_heavy_document_reaches_extreme() {
        let engine = TemporalEngine::new(EngineConfig::default()).unwrap();
        let signals = engine.process(&uniform(60, 1.0)).unwrap();
        assert_eq!(signals[40].fatigue_state, FatigueState::Extreme);
        assert!(signals
            .iter()
            .all(|s| s.attentional_signal <= engine.config().signal_upper_bound()));
    }

    #[test]
    fn test_empty_input() {
        let engine = TemporalEngine::new(EngineConfig::default()).unwrap();
        assert!(engine.process(&[]).unwrap().is_empty());
    }
}
