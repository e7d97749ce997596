//! Report encoding
//!
//! This module wraps a document's signals and patterns into a versioned,
//! provenance-stamped analysis report. Every report names the configuration
//! version it was computed with.

use crate::config::EngineConfig;
use crate::error::AnalysisError;
use crate::schema::SCHEMA_VERSION;
use crate::summary::SignalSummary;
use crate::suppression::SuppressionOutcome;
use crate::types::{
    AnalysisReport, PatternDescriptor, ReportProducer, ReportProvenance, TemporalSignal,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder for producing analysis payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode a report stamped with the current time
    pub fn encode(
        &self,
        config: &EngineConfig,
        signals: &[TemporalSignal],
        patterns: &[PatternDescriptor],
    ) -> Result<AnalysisReport, AnalysisError> {
        self.encode_at(config, signals, patterns, Utc::now())
    }

    /// Encode a report stamped with `computed_at`
    pub fn encode_at(
        &self,
        config: &EngineConfig,
        signals: &[TemporalSignal],
        patterns: &[PatternDescriptor],
        computed_at: DateTime<Utc>,
    ) -> Result<AnalysisReport, AnalysisError> {
        for pattern in patterns {
            let range = pattern.scene_range;
            if range.start() == 0 || range.is_empty() || range.end() > signals.len() {
                return Err(AnalysisError::EncodingError(format!(
                    "{} range [{}, {}] is outside scenes 1..={}",
                    pattern.pattern_type,
                    range.start(),
                    range.end(),
                    signals.len()
                )));
            }
        }

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            config_version: config.version.clone(),
            schema_version: SCHEMA_VERSION.to_string(),
            scene_count: signals.len(),
            computed_at_utc: computed_at.to_rfc3339(),
        };

        Ok(AnalysisReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            summary: SignalSummary::from_signals(signals, &config.length),
            signals: signals.to_vec(),
            patterns: patterns.to_vec(),
            suppression: None,
        })
    }

    /// Attach a suppression outcome to an encoded report
    pub fn with_suppression(report: AnalysisReport, outcome: SuppressionOutcome) -> AnalysisReport {
        AnalysisReport {
            suppression: Some(outcome),
            ..report
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(
        &self,
        config: &EngineConfig,
        signals: &[TemporalSignal],
        patterns: &[PatternDescriptor],
    ) -> Result<String, AnalysisError> {
        let report = self.encode(config, signals, patterns)?;
        serde_json::to_string_pretty(&report).map_err(AnalysisError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfidenceBand, FatigueState, PatternKind, SceneRange, SupportingMetrics};

    fn make_test_signals() -> Vec<TemporalSignal> {
        [0.4, 0.9, 1.3, 1.6, 0.7]
            .iter()
            .enumerate()
            .map(|(i, s)| TemporalSignal {
                scene_index: i + 1,
                instantaneous_effort: 0.5,
                attentional_signal: *s,
                recovery_credit: 0.0,
                fatigue_state: FatigueState::Normal,
            })
            .collect()
    }

    fn make_test_pattern(start: usize, end: usize) -> PatternDescriptor {
        PatternDescriptor::new(
            PatternKind::SustainedDemand,
            SceneRange(start, end),
            ConfidenceBand::Medium,
            SupportingMetrics::new(),
        )
    }

    #[test]
    fn test_encode_report() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let config = EngineConfig::default();
        let computed_at = "2024-01-15T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let report = encoder
            .encode_at(&config, &make_test_signals(), &[make_test_pattern(2, 4)], computed_at)
            .unwrap();

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.version, ENGINE_VERSION);
        assert_eq!(report.producer.instance_id, "test-instance");

        assert_eq!(report.provenance.config_version, config.version);
        assert_eq!(report.provenance.schema_version, SCHEMA_VERSION);
        assert_eq!(report.provenance.scene_count, 5);
        assert_eq!(report.provenance.computed_at_utc, "2024-01-15T08:00:00+00:00");

        assert_eq!(report.summary.peak_scene, Some(4));
        assert_eq!(report.patterns.len(), 1);
        assert!(report.suppression.is_none());
    }

    #[test]
    fn test_fixed_timestamp_is_reproducible() {
        let encoder = ReportEncoder::with_instance_id("fixed".to_string());
        let config = EngineConfig::default();
        let computed_at = Utc::now();
        let a = encoder
            .encode_at(&config, &make_test_signals(), &[], computed_at)
            .unwrap();
        let b = encoder
            .encode_at(&config, &make_test_signals(), &[], computed_at)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pattern_outside_document_fails() {
        let encoder = ReportEncoder::new();
        let err = encoder
            .encode(&EngineConfig::default(), &make_test_signals(), &[make_test_pattern(3, 9)])
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EncodingError(_)));
    }

    #[test]
    fn test_encode_to_json() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json(&EngineConfig::default(), &make_test_signals(), &[make_test_pattern(1, 3)])
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("report_version").is_some());
        assert!(parsed.get("producer").is_some());
        assert!(parsed.get("provenance").is_some());
        assert!(parsed.get("summary").is_some());
        assert_eq!(parsed["signals"].as_array().unwrap().len(), 5);
        assert_eq!(parsed["patterns"][0]["scene_range"], serde_json::json!([1, 3]));
        assert!(parsed.get("suppression").is_none());
    }
}
