use pretty_assertions::assert_eq;
use scenepulse::types::{
    ConfidenceBand, FatigueState, PatternDescriptor, PatternKind, SceneFeatures, TemporalSignal,
};
use scenepulse::{EngineConfig, PatternDetector, TemporalEngine};

/// Scene whose non-structural fields all sit at `level`
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

fn document(levels: &[f64]) -> Vec<SceneFeatures> {
    levels
        .iter()
        .enumerate()
        .map(|(i, level)| scene(i + 1, *level))
        .collect()
}

/// Thirty scenes whose load climbs steadily from light to heavy
fn ramp() -> Vec<SceneFeatures> {
    let levels: Vec<f64> = (0..30).map(|i| 0.1 + 0.9 * i as f64 / 29.0).collect();
    document(&levels)
}

fn analyze(
    config: EngineConfig,
    features: &[SceneFeatures],
) -> (Vec<TemporalSignal>, Vec<PatternDescriptor>) {
    let engine = TemporalEngine::new(config.clone()).unwrap();
    let detector = PatternDetector::new(config).unwrap();
    let signals = engine.process(features).unwrap();
    let contexts = engine.scene_contexts(features);
    let patterns = detector.detect(&signals, &contexts).unwrap();
    (signals, patterns)
}

fn kinds(patterns: &[PatternDescriptor]) -> Vec<PatternKind> {
    let mut kinds: Vec<PatternKind> = patterns.iter().map(|p| p.pattern_type).collect();
    kinds.dedup();
    kinds
}

#[test]
fn flat_light_document_stays_quiet() {
    let features = document(&[0.1; 60]);
    let (signals, patterns) = analyze(EngineConfig::default(), &features);

    assert_eq!(signals.len(), 60);
    assert!(signals
        .iter()
        .all(|s| s.fatigue_state == FatigueState::Normal));
    assert!(signals.iter().all(|s| s.attentional_signal < 0.1));

    // Identical scenes may read as repetition; nothing else should fire
    assert!(patterns
        .iter()
        .all(|p| p.pattern_type == PatternKind::SequenceRepetition));
}

#[test]
fn ramp_shows_wall_and_degenerative_tail() {
    let features = ramp();
    let (with_wall, patterns) = analyze(EngineConfig::default(), &features);

    let mut no_wall_config = EngineConfig::default();
    no_wall_config.wall.coefficient = 0.0;
    let (without_wall, _) = analyze(no_wall_config, &features);

    // Below the ceiling the wall is inert
    for i in 0..15 {
        assert_eq!(
            with_wall[i].attentional_signal,
            without_wall[i].attentional_signal
        );
    }
    // Above it, the wall's contribution keeps growing while the load climbs
    let contribution: Vec<f64> = (15..27)
        .map(|i| with_wall[i].attentional_signal - without_wall[i].attentional_signal)
        .collect();
    assert!(contribution.windows(2).all(|w| w[1] > w[0]));
    assert!(contribution[contribution.len() - 1] > 1.0);

    // The ending buffer brings the last scene down from the peak
    let peak = with_wall
        .iter()
        .map(|s| s.attentional_signal)
        .fold(0.0, f64::max);
    assert!(with_wall[29].attentional_signal < peak);
    assert_eq!(with_wall[26].fatigue_state, FatigueState::Extreme);

    let degenerative: Vec<&PatternDescriptor> = patterns
        .iter()
        .filter(|p| p.pattern_type == PatternKind::DegenerativeFatigue)
        .collect();
    assert_eq!(degenerative.len(), 1);
    let tail = degenerative[0];
    assert!(tail.scene_range.start() <= 15);
    assert!(tail.scene_range.end() >= 27);
    assert!(tail.confidence_band() >= ConfidenceBand::Medium);
    assert!(tail.supporting_metrics["signal_slope"] > 0.02);
    assert!(tail.supporting_metrics["mean_recovery"] < 0.1);

    assert!(patterns
        .iter()
        .any(|p| p.pattern_type == PatternKind::SustainedDemand));
}

#[test]
fn opening_buffer_damps_early_carryover() {
    let mut levels = vec![0.3; 40];
    for level in levels.iter_mut().take(5) {
        *level = 1.0;
    }
    let features = document(&levels);

    let (buffered, _) = analyze(EngineConfig::default(), &features);
    let mut unbuffered_config = EngineConfig::default();
    unbuffered_config.buffers.opening_scenes = 0;
    let (unbuffered, _) = analyze(unbuffered_config, &features);

    assert_eq!(
        buffered[0].attentional_signal,
        unbuffered[0].attentional_signal
    );
    assert_eq!(
        buffered[0].attentional_signal,
        buffered[0].instantaneous_effort
    );
    for i in 1..3 {
        assert!(buffered[i].attentional_signal < unbuffered[i].attentional_signal);
    }
}

#[test]
fn single_heavy_scene_does_not_make_a_pattern() {
    let quiet = document(&[0.05; 60]);
    let mut levels = vec![0.05; 60];
    levels[30] = 1.0;
    let spiked = document(&levels);

    let config = EngineConfig::default();
    let (quiet_signals, quiet_patterns) = analyze(config.clone(), &quiet);
    let (signals, spiked_patterns) = analyze(config.clone(), &spiked);

    // The jump is limited to the recurrence plus one wall penalty
    let spike = &signals[30];
    assert!(spike.attentional_signal > signals[29].attentional_signal);
    assert!(
        spike.attentional_signal
            <= spike.instantaneous_effort
                + config.lambda * signals[29].attentional_signal
                + config.wall.max_penalty()
    );

    // Then it decays back to the quiet document's level within a few scenes
    for i in 31..36 {
        assert!(signals[i].attentional_signal < signals[i - 1].attentional_signal);
    }
    for i in 40..50 {
        assert!(
            (signals[i].attentional_signal - quiet_signals[i].attentional_signal).abs() < 1e-9,
            "scene {} has not settled",
            i + 1
        );
    }
    let baseline_kinds = kinds(&quiet_patterns);
    for pattern in &spiked_patterns {
        assert!(
            baseline_kinds.contains(&pattern.pattern_type),
            "spike produced {:?}",
            pattern
        );
    }
}

#[test]
fn weaker_segmentation_never_raises_confidence() {
    let features = ramp();
    let weak: Vec<SceneFeatures> = features
        .iter()
        .map(|f| SceneFeatures {
            segmentation_confidence: 0.6,
            ..f.clone()
        })
        .collect();

    let (_, strong_patterns) = analyze(EngineConfig::default(), &features);
    let (_, weak_patterns) = analyze(EngineConfig::default(), &weak);

    assert_eq!(strong_patterns.len(), weak_patterns.len());
    for (strong, weak) in strong_patterns.iter().zip(weak_patterns.iter()) {
        assert_eq!(strong.pattern_type, weak.pattern_type);
        assert_eq!(strong.scene_range, weak.scene_range);
        assert!(weak.confidence_band() <= strong.confidence_band());
        assert!(weak.confidence_band() <= ConfidenceBand::Medium);
    }
}

#[test]
fn analysis_is_deterministic() {
    let features = ramp();
    let first = analyze(EngineConfig::default(), &features);
    let second = analyze(EngineConfig::default(), &features);
    assert_eq!(first, second);
}

#[test]
fn tiny_document_has_no_patterns() {
    let features = document(&[1.0, 1.0]);
    let (signals, patterns) = analyze(EngineConfig::default(), &features);
    assert_eq!(signals.len(), 2);
    assert!(patterns.is_empty());
}
