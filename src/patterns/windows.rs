//! Multi-window consensus scan
//!
//! One generic scan shared by every pattern kind. Each tier slides a window of
//! its size over the sequence and marks the scenes covered by windows where
//! the kind's predicate holds. A scene is confirmed when enough tiers mark it;
//! contiguous confirmed runs of at least the persistence floor are candidates.
//! Fewer than two fitting tiers means no candidates at all.

use std::ops::Range;

/// A run of confirmed scenes (0-based, inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusRun {
    pub start: usize,
    pub end: usize,
    /// Largest number of tiers marking any scene of the run
    pub tier_agreement: usize,
}

impl ConsensusRun {
    /// Scenes in the run (never zero)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Window sizes that apply to a sequence of `len` scenes.
///
/// Every tier is raised to the kind's own minimum window; tiers longer than
/// the sequence do not apply. Sizes are deduplicated so two tiers never count
/// the same view twice.
pub fn tier_windows(tiers: [usize; 3], min_window: usize, len: usize) -> Vec<usize> {
    let mut windows: Vec<usize> = tiers
        .iter()
        .map(|tier| (*tier).max(min_window).max(1))
        .filter(|window| *window <= len)
        .collect();
    windows.sort_unstable();
    windows.dedup();
    windows
}

/// Scenes covered by at least one window of size `window` where `holds` is true
pub fn window_mask<F>(len: usize, window: usize, holds: F) -> Vec<bool>
where
    F: Fn(Range<usize>) -> bool,
{
    let mut mask = vec![false; len];
    if window == 0 || window > len {
        return mask;
    }
    for start in 0..=(len - window) {
        let range = start..start + window;
        if holds(range.clone()) {
            for covered in &mut mask[range] {
                *covered = true;
            }
        }
    }
    mask
}

/// Contiguous runs confirmed by at least `required` masks, of length `min_len` or more
pub fn consensus_runs(masks: &[Vec<bool>], required: usize, min_len: usize) -> Vec<ConsensusRun> {
    let len = masks.first().map_or(0, Vec::len);
    if required == 0 || masks.len() < required {
        return Vec::new();
    }

    let counts: Vec<usize> = (0..len)
        .map(|i| masks.iter().filter(|mask| mask[i]).count())
        .collect();

    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for i in 0..=len {
        let confirmed = i < len && counts[i] >= required;
        match (confirmed, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    let tier_agreement = counts[s..i].iter().copied().max().unwrap_or(0);
                    runs.push(ConsensusRun {
                        start: s,
                        end: i - 1,
                        tier_agreement,
                    });
                }
                start = None;
            }
            _ => {}
        }
    }
    runs
}

/// Full scan: tier windows → masks → consensus runs
pub fn scan<F>(
    len: usize,
    tiers: [usize; 3],
    min_window: usize,
    required_agreement: usize,
    min_len: usize,
    holds: F,
) -> Vec<ConsensusRun>
where
    F: Fn(Range<usize>) -> bool,
{
    let windows = tier_windows(tiers, min_window, len);
    if windows.is_empty() {
        return Vec::new();
    }
    // A pattern seen at a single tier never counts, even when only one tier fits
    if windows.len() < 2 {
        return Vec::new();
    }
    let required = required_agreement.clamp(2, windows.len());
    let masks: Vec<Vec<bool>> = windows
        .iter()
        .map(|window| window_mask(len, *window, &holds))
        .collect();
    consensus_runs(&masks, required, min_len)
}
