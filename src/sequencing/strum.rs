//! Strum ordering.
//!
//! A strum is not a block chord: the pick crosses the strings one after the
//! other. The gap between strings is a fixed texture parameter, independent
//! of tempo and of note duration.

use super::note::{Note, StrumDirection};

/// Default gap between consecutive strings of a strum, in seconds.
pub const DEFAULT_STRUM_DELAY: f64 = 0.020;

/// The notes of one step in firing order.
#[derive(Debug, Clone, PartialEq)]
pub struct StrumOrder {
    pub notes: Vec<Note>,
    /// Seconds between consecutive notes.
    pub delay: f64,
}

impl StrumOrder {
    /// Offset of the `k`-th note from the start of the step.
    pub fn offset(&self, k: usize) -> f64 {
        k as f64 * self.delay
    }

    /// Notes paired with their offsets from the step start.
    pub fn timed(&self) -> impl Iterator<Item = (f64, &Note)> + '_ {
        self.notes
            .iter()
            .enumerate()
            .map(move |(k, note)| (self.offset(k), note))
    }
}

/// Order `notes` for `direction`.
///
/// Up strums fire in ascending string index, down strums in descending
/// index. The sort is stable, so two notes sharing a string keep their
/// recorded order; that case should not occur in well-formed steps and is
/// logged.
pub fn order(notes: &[Note], direction: StrumDirection, delay: f64) -> StrumOrder {
    let mut sorted = notes.to_vec();
    match direction {
        StrumDirection::Up => sorted.sort_by_key(|n| n.string()),
        StrumDirection::Down => sorted.sort_by_key(|n| std::cmp::Reverse(n.string())),
    }

    if sorted.windows(2).any(|w| w[0].string() == w[1].string()) {
        log::warn!("strum contains two notes on the same string; keeping recorded order");
    }

    StrumOrder {
        notes: sorted,
        delay,
    }
}
