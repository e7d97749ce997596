//! Adapter for reading scene.counts.v1 payloads
//!
//! Accepts either a JSON array of records or NDJSON with one record per line.
//! Blank NDJSON lines are skipped; a malformed line fails the whole payload
//! with its line number.

use crate::error::AnalysisError;
use crate::schema::scene_counts::{RawSceneCounts, ValidationError};

/// Adapter for parsing raw scene count payloads
pub struct SceneCountsAdapter;

impl SceneCountsAdapter {
    /// Parse a JSON string containing an array of RawSceneCounts
    pub fn parse_array(json: &str) -> Result<Vec<RawSceneCounts>, AnalysisError> {
        let records: Vec<RawSceneCounts> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing RawSceneCounts
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawSceneCounts>, AnalysisError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawSceneCounts>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(AnalysisError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Parse either payload shape and validate every record.
    ///
    /// A payload whose first non-blank character is `[` is read as an array.
    pub fn parse_document(input: &str) -> Result<Vec<RawSceneCounts>, AnalysisError> {
        let records = if input.trim_start().starts_with('[') {
            Self::parse_array(input)?
        } else {
            Self::parse_ndjson(input)?
        };

        if let Some(failure) = Self::validate_records(&records).into_iter().next() {
            return Err(AnalysisError::InvalidRecord(format!(
                "scene {}: {}",
                failure.index + 1,
                failure.error
            )));
        }
        Ok(records)
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[RawSceneCounts]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index,
                    scene_id: record.scene_id.clone(),
                    error,
                })
            })
            .collect()
    }
}

/// A record that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    /// 0-based position in the payload
    pub index: usize,
    pub scene_id: Option<String>,
    pub error: ValidationError,
}
