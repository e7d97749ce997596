//! Signal accumulation
//!
//! Applies the canonical recurrence one scene at a time:
//!
//! ```text
//! S[0] = E[0]
//! S[i] = E[i] + λ_eff[i]·S[i-1] − R[i]
//! ```
//!
//! followed by the quadratic fatigue wall above the ceiling. `λ_eff` ramps up
//! over the opening buffer and tapers over the ending buffer.

use crate::config::{BufferConfig, EngineConfig, FatigueWallConfig};

/// Stateful accumulator for one document
#[derive(Debug, Clone)]
pub struct SignalAccumulator {
    lambda: f64,
    buffers: BufferConfig,
    wall: FatigueWallConfig,
    total_scenes: usize,
    ending_scenes: usize,
    position: usize,
    previous: Option<f64>,
}

impl SignalAccumulator {
    /// Create an accumulator for a document of `total_scenes` scenes
    pub fn new(config: &EngineConfig, total_scenes: usize) -> Self {
        let ending_scenes = ((total_scenes as f64) * config.buffers.ending_fraction).ceil() as usize;
        Self {
            lambda: config.lambda,
            buffers: config.buffers,
            wall: config.wall,
            total_scenes,
            ending_scenes: ending_scenes.min(total_scenes),
            position: 0,
            previous: None,
        }
    }

    /// Effective carryover coefficient at a 0-based scene position
    pub fn carryover(&self, position: usize) -> f64 {
        let mut multiplier: f64 = 1.0;

        let opening = self.buffers.opening_scenes;
        if opening > 0 && position < opening {
            multiplier = multiplier.min(position as f64 / opening as f64);
        }

        let ending = self.ending_scenes;
        if ending > 0 && position + ending >= self.total_scenes {
            // 1 at the first buffered scene, `ending` at the last
            let depth = position + ending + 1 - self.total_scenes;
            let taper = (1.0 - self.buffers.ending_floor) * depth as f64 / ending as f64;
            multiplier = multiplier.min(1.0 - taper);
        }

        self.lambda * multiplier
    }

    /// Advance one scene and return its attentional signal
    pub fn push(&mut self, effort: f64, recovery: f64) -> f64 {
        let signal = match self.previous {
            None => effort,
            Some(previous) => {
                let carried = self.carryover(self.position) * previous;
                let raw = (effort + carried - recovery).max(0.0);
                apply_fatigue_wall(raw, &self.wall)
            }
        };
        self.previous = Some(signal);
        self.position += 1;
        signal
    }

    /// Scenes processed so far
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Quadratic penalty on the excess above the ceiling.
///
/// Sub-ceiling signals pass through untouched; the squared excess is capped at
/// `excess_span` so one scene adds at most `α·span²`.
pub fn apply_fatigue_wall(signal: f64, wall: &FatigueWallConfig) -> f64 {
    if signal <= wall.ceiling {
        return signal;
    }
    let excess = (signal - wall.ceiling).min(wall.excess_span);
    signal + wall.coefficient * excess * excess
}
