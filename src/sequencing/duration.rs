#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Written note value of a fretted note or rest.
///
/// The factor is measured in beats with the quarter note as one beat, so a
/// note lasts `(60 / tempo) * factor` seconds regardless of the time
/// signature.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteDuration {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    #[cfg_attr(feature = "serde", serde(alias = "thirty-second"))]
    ThirtySecond,
    #[cfg_attr(feature = "serde", serde(alias = "sixty-fourth"))]
    SixtyFourth,
}

impl NoteDuration {
    /// All durations, longest first.
    pub const ALL: [NoteDuration; 7] = [
        NoteDuration::Whole,
        NoteDuration::Half,
        NoteDuration::Quarter,
        NoteDuration::Eighth,
        NoteDuration::Sixteenth,
        NoteDuration::ThirtySecond,
        NoteDuration::SixtyFourth,
    ];

    /// Length in beats (quarter = 1).
    pub const fn factor(self) -> f64 {
        match self {
            NoteDuration::Whole => 4.0,
            NoteDuration::Half => 2.0,
            NoteDuration::Quarter => 1.0,
            NoteDuration::Eighth => 0.5,
            NoteDuration::Sixteenth => 0.25,
            NoteDuration::ThirtySecond => 0.125,
            NoteDuration::SixtyFourth => 0.0625,
        }
    }

    /// Length in seconds at the given tempo.
    ///
    /// Callers validate the tempo first; see `TransportConfig::set_tempo`.
    pub fn seconds(self, tempo_bpm: f64) -> f64 {
        (60.0 / tempo_bpm) * self.factor()
    }

    /// Name used in song files and on screen.
    pub const fn name(self) -> &'static str {
        match self {
            NoteDuration::Whole => "whole",
            NoteDuration::Half => "half",
            NoteDuration::Quarter => "quarter",
            NoteDuration::Eighth => "eighth",
            NoteDuration::Sixteenth => "sixteenth",
            NoteDuration::ThirtySecond => "thirtysecond",
            NoteDuration::SixtyFourth => "sixtyfourth",
        }
    }

    /// Next shorter value, wrapping from sixty-fourth back to whole.
    pub fn shorter(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(2);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for NoteDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for NoteDuration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name() == normalized)
            .ok_or_else(|| ValidationError::UnknownDuration(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors_halve_down_the_table() {
        for pair in NoteDuration::ALL.windows(2) {
            assert!((pair[0].factor() - 2.0 * pair[1].factor()).abs() < 1e-12);
        }
        assert_eq!(NoteDuration::Quarter.factor(), 1.0);
    }

    #[test]
    fn test_quarter_at_120_is_half_a_second() {
        assert!((NoteDuration::Quarter.seconds(120.0) - 0.5).abs() < 1e-12);
        assert!((NoteDuration::Whole.seconds(60.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_accepts_spellings() {
        assert_eq!("quarter".parse::<NoteDuration>(), Ok(NoteDuration::Quarter));
        assert_eq!(
            "thirty-second".parse::<NoteDuration>(),
            Ok(NoteDuration::ThirtySecond)
        );
        assert_eq!(
            "SixtyFourth".parse::<NoteDuration>(),
            Ok(NoteDuration::SixtyFourth)
        );
        assert!("dotted".parse::<NoteDuration>().is_err());
    }

    #[test]
    fn test_shorter_wraps() {
        assert_eq!(NoteDuration::Quarter.shorter(), NoteDuration::Eighth);
        assert_eq!(NoteDuration::SixtyFourth.shorter(), NoteDuration::Whole);
    }
}
