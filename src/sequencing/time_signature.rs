#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Time signature: beats per measure over the note value of one beat.
///
/// The beat unit stretches the step grid: one recorded step lasts
/// `(60 / tempo) * (beat_unit / 4)` seconds, so at the same tempo a 6/8 song
/// steps twice as slowly as a 4/4 one.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    /// Number of beats per measure (numerator)
    pub beats_per_measure: u8,
    /// Note value that gets one beat (denominator: 4 = quarter, 8 = eighth)
    pub beat_unit: u8,
}

impl TimeSignature {
    /// Standard 4/4 time
    pub const FOUR_FOUR: TimeSignature = TimeSignature {
        beats_per_measure: 4,
        beat_unit: 4,
    };

    /// 3/4 time (waltz)
    pub const THREE_FOUR: TimeSignature = TimeSignature {
        beats_per_measure: 3,
        beat_unit: 4,
    };

    /// 6/8 time (compound duple)
    pub const SIX_EIGHT: TimeSignature = TimeSignature {
        beats_per_measure: 6,
        beat_unit: 8,
    };

    /// 2/2 time (cut time)
    pub const TWO_TWO: TimeSignature = TimeSignature {
        beats_per_measure: 2,
        beat_unit: 2,
    };

    /// Signatures offered by the front-end, in cycling order.
    pub const COMMON: [TimeSignature; 4] = [
        TimeSignature::FOUR_FOUR,
        TimeSignature::THREE_FOUR,
        TimeSignature::SIX_EIGHT,
        TimeSignature::TWO_TWO,
    ];

    /// Create a time signature. Both fields must be above zero.
    pub fn new(beats_per_measure: u32, beat_unit: u32) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTimeSignature {
            beats_per_measure,
            beat_unit,
        };
        if beats_per_measure == 0 || beat_unit == 0 {
            return Err(invalid());
        }
        Ok(Self {
            beats_per_measure: u8::try_from(beats_per_measure).map_err(|_| invalid())?,
            beat_unit: u8::try_from(beat_unit).map_err(|_| invalid())?,
        })
    }

    /// Seconds between consecutive step starts at `tempo_bpm`.
    ///
    /// Formula: (60 / tempo) * (beat_unit / 4)
    pub fn seconds_per_step(&self, tempo_bpm: f64) -> f64 {
        (60.0 / tempo_bpm) * (self.beat_unit as f64 / 4.0)
    }

    /// Check if this is a compound meter (6/8, 9/8, 12/8)
    pub fn is_compound(&self) -> bool {
        self.beat_unit == 8 && self.beats_per_measure % 3 == 0 && self.beats_per_measure > 3
    }

    /// Next entry of [`TimeSignature::COMMON`], wrapping.
    pub fn next_common(&self) -> Self {
        let idx = Self::COMMON.iter().position(|ts| ts == self);
        match idx {
            Some(i) => Self::COMMON[(i + 1) % Self::COMMON.len()],
            None => Self::FOUR_FOUR,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::FOUR_FOUR
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.beats_per_measure, self.beat_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_four_step_length() {
        // 120 BPM, quarter-note beat: 0.5 s per step
        let ts = TimeSignature::FOUR_FOUR;
        assert!((ts.seconds_per_step(120.0) - 0.5).abs() < 1e-12);
        assert!(!ts.is_compound());
    }

    #[test]
    fn test_six_eight_meter() {
        let ts = TimeSignature::SIX_EIGHT;
        // beat_unit 8 doubles the step length
        assert!((ts.seconds_per_step(120.0) - 1.0).abs() < 1e-12);
        assert!(ts.is_compound());
    }

    #[test]
    fn test_two_two_meter() {
        let ts = TimeSignature::TWO_TWO;
        assert!((ts.seconds_per_step(120.0) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_zero_fields() {
        assert!(TimeSignature::new(0, 4).is_err());
        assert!(TimeSignature::new(4, 0).is_err());
        assert!(TimeSignature::new(300, 4).is_err());
        assert_eq!(TimeSignature::new(3, 4), Ok(TimeSignature::THREE_FOUR));
    }

    #[test]
    fn test_cycles_common_signatures() {
        let mut ts = TimeSignature::FOUR_FOUR;
        for _ in 0..TimeSignature::COMMON.len() {
            ts = ts.next_common();
        }
        assert_eq!(ts, TimeSignature::FOUR_FOUR);
        assert_eq!(TimeSignature::SIX_EIGHT.to_string(), "6/8");
    }
}
