//! Confidence assignment
//!
//! A pattern's band is the lowest of three component bands (persistence,
//! residual variation of the signal, upstream segmentation confidence), capped
//! at medium when the whole document shows little contrast. Bands are computed
//! once here; later stages can only lower them.

use crate::config::ConfidenceThresholds;
use crate::types::ConfidenceBand;

/// Confidence assessor for one document
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceAssessor {
    thresholds: ConfidenceThresholds,
    low_contrast: bool,
}

impl ConfidenceAssessor {
    pub fn new(thresholds: ConfidenceThresholds, document_contrast: f64) -> Self {
        Self {
            low_contrast: document_contrast < thresholds.low_contrast,
            thresholds,
        }
    }

    pub fn is_low_contrast(&self) -> bool {
        self.low_contrast
    }

    /// Band for a pattern over `signals` with per-scene `segmentation` confidence
    pub fn assess(&self, signals: &[f64], segmentation: &[f64]) -> ConfidenceBand {
        let band = self
            .persistence_band(signals.len())
            .capped_at(self.variation_band(residual_variation(signals)))
            .capped_at(self.upstream_band(mean(segmentation)));

        if self.low_contrast {
            band.capped_at(ConfidenceBand::Medium)
        } else {
            band
        }
    }

    fn persistence_band(&self, scenes: usize) -> ConfidenceBand {
        if scenes >= self.thresholds.high_persistence {
            ConfidenceBand::High
        } else if scenes >= self.thresholds.medium_persistence {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    fn variation_band(&self, variation: f64) -> ConfidenceBand {
        if variation <= self.thresholds.high_variation {
            ConfidenceBand::High
        } else if variation <= self.thresholds.medium_variation {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    fn upstream_band(&self, confidence: f64) -> ConfidenceBand {
        if confidence >= self.thresholds.high_upstream {
            ConfidenceBand::High
        } else if confidence >= self.thresholds.medium_upstream {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Least-squares slope of `values` against their position
pub(crate) fn slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Standard deviation of `values` around their least-squares line, relative to their mean.
///
/// A steady trend is the pattern itself, not noise; only the scatter around it
/// counts against confidence. Zero-mean input yields zero.
pub fn residual_variation(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let y_mean = mean(values);
    if y_mean <= f64::EPSILON {
        return 0.0;
    }
    let b = slope(values);
    let x_mean = (n - 1) as f64 / 2.0;
    let a = y_mean - b * x_mean;
    let residual = values
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let fitted = a + b * i as f64;
            (y - fitted).powi(2)
        })
        .sum::<f64>()
        / n as f64;
    residual.sqrt() / y_mean
}
