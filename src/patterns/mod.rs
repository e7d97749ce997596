//! Pattern detection
//!
//! Consumes a completed temporal signal plus per-scene context and reports
//! persistent shapes over contiguous scene ranges. Every kind runs the same
//! multi-window consensus scan with its own predicate. Nothing here feeds back
//! into the signal.

mod confidence;
mod shapes;
pub mod windows;

pub use confidence::{residual_variation, ConfidenceAssessor};

use crate::config::EngineConfig;
use crate::error::AnalysisError;
use crate::temporal::length_factor;
use crate::types::{
    PatternDescriptor, PatternKind, SceneContext, SceneRange, SupportingMetrics, TemporalSignal,
};
use confidence::mean;
use shapes::ShapeInputs;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pattern detector bound to one immutable configuration
#[derive(Debug, Clone)]
pub struct PatternDetector {
    config: EngineConfig,
}

impl PatternDetector {
    /// Create a detector, validating the configuration
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Detect patterns over the whole document.
    ///
    /// Output is ordered by kind, then by range start. Documents shorter than
    /// the persistence floor produce no patterns.
    pub fn detect(
        &self,
        signals: &[TemporalSignal],
        contexts: &[SceneContext],
    ) -> Result<Vec<PatternDescriptor>, AnalysisError> {
        if signals.len() != contexts.len() {
            return Err(AnalysisError::LengthMismatch {
                signals: signals.len(),
                contexts: contexts.len(),
            });
        }
        let thresholds = &self.config.patterns;
        if signals.len() < thresholds.min_persistence {
            debug!(scenes = signals.len(), "too few scenes for pattern detection");
            return Ok(Vec::new());
        }

        let values: Vec<f64> = signals.iter().map(|s| s.attentional_signal).collect();
        let recovery: Vec<f64> = signals.iter().map(|s| s.recovery_credit).collect();
        let deltas: Vec<f64> = contexts.iter().map(|c| c.structural_delta).collect();
        let segmentation: Vec<f64> = contexts.iter().map(|c| c.segmentation_confidence).collect();
        let profiles: Vec<_> = contexts.iter().map(|c| c.profile).collect();

        let factor = length_factor(signals.len(), &self.config.length);
        let inputs = ShapeInputs {
            signals: &values,
            recovery: &recovery,
            deltas: &deltas,
            profiles: &profiles,
            elevated: thresholds.elevated_signal * factor,
            baseline: thresholds.baseline_signal * factor,
            thresholds,
        };

        let contrast = document_contrast(&values);
        let assessor = ConfidenceAssessor::new(self.config.confidence, contrast);
        let scan = KindScan {
            detector: self,
            inputs,
            assessor,
            signals,
            segmentation: &segmentation,
        };

        #[cfg(feature = "parallel")]
        let per_kind: Vec<Vec<PatternDescriptor>> = PatternKind::ALL
            .as_slice()
            .par_iter()
            .map(|kind| scan.run(*kind))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let per_kind: Vec<Vec<PatternDescriptor>> =
            PatternKind::ALL.iter().map(|kind| scan.run(*kind)).collect();

        let patterns: Vec<PatternDescriptor> = per_kind.into_iter().flatten().collect();
        debug!(
            scenes = signals.len(),
            patterns = patterns.len(),
            contrast,
            low_contrast = assessor.is_low_contrast(),
            "pattern detection complete"
        );
        Ok(patterns)
    }
}

/// Everything one kind's scan reads; shared across kinds
struct KindScan<'a> {
    detector: &'a PatternDetector,
    inputs: ShapeInputs<'a>,
    assessor: ConfidenceAssessor,
    signals: &'a [TemporalSignal],
    segmentation: &'a [f64],
}

impl KindScan<'_> {
    fn run(&self, kind: PatternKind) -> Vec<PatternDescriptor> {
        let config = &self.detector.config;
        let inputs = &self.inputs;
        let runs = windows::scan(
            inputs.len(),
            config.windows.as_array(),
            inputs.min_window(kind),
            config.windows.required_agreement,
            config.patterns.min_persistence,
            |range| inputs.holds(kind, range),
        );

        let mut found = Vec::new();
        for run in &runs {
            let Some(range) = inputs.finalize(kind, run) else {
                continue;
            };
            let window = &inputs.signals[range.clone()];
            let segmentation = &self.segmentation[range.clone()];

            let mut metrics = SupportingMetrics::new();
            metrics.insert("scene_count".to_string(), range.len() as f64);
            metrics.insert("mean_signal".to_string(), mean(window));
            metrics.insert(
                "peak_signal".to_string(),
                window.iter().copied().fold(0.0, f64::max),
            );
            metrics.insert(
                "mean_recovery".to_string(),
                mean(&inputs.recovery[range.clone()]),
            );
            metrics.insert("signal_variation".to_string(), residual_variation(window));
            metrics.insert("tier_agreement".to_string(), run.tier_agreement as f64);
            metrics.insert(
                "mean_segmentation_confidence".to_string(),
                mean(segmentation),
            );
            inputs.extra_metrics(kind, range.clone(), &mut metrics);

            let scene_range = SceneRange(
                self.signals[range.start].scene_index,
                self.signals[range.end - 1].scene_index,
            );
            found.push(PatternDescriptor::new(
                kind,
                scene_range,
                self.assessor.assess(window, segmentation),
                metrics,
            ));
        }

        debug!(kind = kind.as_str(), runs = runs.len(), patterns = found.len(), "kind scanned");
        found
    }
}

fn document_contrast(values: &[f64]) -> f64 {
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    if high.is_finite() && low.is_finite() {
        high - low
    } else {
        0.0
    }
}
