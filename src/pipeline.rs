//! Pipeline orchestration
//!
//! This module provides the public API for ScenePulse.
//! It orchestrates the full pipeline from raw scene counts to an analysis report.

use crate::config::EngineConfig;
use crate::encoder::ReportEncoder;
use crate::error::AnalysisError;
use crate::normalizer::DocumentNormalizer;
use crate::patterns::PatternDetector;
use crate::schema::SceneCountsAdapter;
use crate::suppression::{IntentInterval, IntentSuppressor};
use crate::temporal::TemporalEngine;
use crate::types::{AnalysisReport, SceneFeatures};
use std::sync::atomic::AtomicBool;
use tracing::info;

/// Analyze a raw scene-count payload (JSON array or NDJSON) into a JSON report.
///
/// # Arguments
/// * `raw_json` - scene.counts.v1 records in reading order
/// * `config` - Engine configuration (validated before use)
///
/// # Returns
/// Pretty-printed analysis report JSON
///
/// # Example
/// ```ignore
/// let report = analyze_document(counts_json, EngineConfig::default())?;
/// ```
pub fn analyze_document(raw_json: &str, config: EngineConfig) -> Result<String, AnalysisError> {
    PulseProcessor::with_config(config)?.process_json(raw_json)
}

/// Process one document through the full pipeline.
///
/// Pipeline stages:
/// 1. TemporalEngine - Effort, recovery and attentional signal per scene
/// 2. TemporalEngine::scene_contexts - Side inputs for pattern detection
/// 3. PatternDetector - Multi-window pattern scan
/// 4. ReportEncoder - Versioned report
fn run_pipeline(
    config: &EngineConfig,
    encoder: &ReportEncoder,
    features: &[SceneFeatures],
    cancel: Option<&AtomicBool>,
) -> Result<AnalysisReport, AnalysisError> {
    let engine = TemporalEngine::from_validated(config.clone());
    let detector = PatternDetector::from_validated(config.clone());

    // Stage 1: temporal signal
    let signals = match cancel {
        Some(flag) => engine.process_cancellable(features, flag)?,
        None => engine.process(features)?,
    };

    // Stage 2: side inputs from the same features
    let contexts = engine.scene_contexts(features);

    // Stage 3: patterns over the completed signal
    let patterns = detector.detect(&signals, &contexts)?;

    // Stage 4: report
    encoder.encode(config, &signals, &patterns)
}

/// Processor holding one immutable configuration and a report encoder.
///
/// Use this when analyzing several documents with the same settings.
pub struct PulseProcessor {
    config: EngineConfig,
    encoder: ReportEncoder,
}

impl Default for PulseProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with a validated configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Use a fixed report instance ID
    pub fn with_instance_id(mut self, instance_id: String) -> Self {
        self.encoder = ReportEncoder::with_instance_id(instance_id);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load configuration from JSON
    pub fn load_config(&mut self, json: &str) -> Result<(), AnalysisError> {
        self.config = EngineConfig::from_json(json)?;
        Ok(())
    }

    /// Save configuration to JSON
    pub fn save_config(&self) -> Result<String, AnalysisError> {
        self.config.to_json()
    }

    /// Analyze normalized scene features
    pub fn analyze(&self, features: &[SceneFeatures]) -> Result<AnalysisReport, AnalysisError> {
        let report = run_pipeline(&self.config, &self.encoder, features, None)?;
        info!(
            scenes = report.provenance.scene_count,
            patterns = report.patterns.len(),
            "document analyzed"
        );
        Ok(report)
    }

    /// Like [`analyze`](Self::analyze), stopping early once `cancel` is set
    pub fn analyze_cancellable(
        &self,
        features: &[SceneFeatures],
        cancel: &AtomicBool,
    ) -> Result<AnalysisReport, AnalysisError> {
        run_pipeline(&self.config, &self.encoder, features, Some(cancel))
    }

    /// Analyze and apply writer intents to the detected patterns.
    ///
    /// The report keeps every detected pattern; the suppression outcome says
    /// which ones are surfaced.
    pub fn analyze_with_intents(
        &self,
        features: &[SceneFeatures],
        intents: Vec<IntentInterval>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let suppressor = IntentSuppressor::new(intents, features.len())?
            .with_min_remainder(self.config.patterns.min_persistence);
        let report = self.analyze(features)?;
        let outcome = suppressor.apply(&report.patterns);
        Ok(ReportEncoder::with_suppression(report, outcome))
    }

    /// Parse, normalize and analyze a raw payload, returning report JSON
    pub fn process_json(&self, raw_json: &str) -> Result<String, AnalysisError> {
        let records = SceneCountsAdapter::parse_document(raw_json)?;
        let features = DocumentNormalizer::normalize(&records);
        let report = self.analyze(&features)?;
        serde_json::to_string_pretty(&report).map_err(AnalysisError::JsonError)
    }
}
