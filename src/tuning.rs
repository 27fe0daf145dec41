//! Standard-tuning fretboard to pitch mapping.
//!
//! String 0 is the high E, string 5 the low E. Every consumer in the crate
//! (strum ordering, tablature rendering, song files) uses this orientation.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::sequencing::note::{Note, NUM_STRINGS};

/// Open-string frequencies in Hz, high E first.
pub const OPEN_FREQUENCIES: [f64; NUM_STRINGS] = [329.63, 246.94, 196.00, 146.83, 110.00, 82.41];

/// Pitch class of each open string, high E first.
pub const OPEN_PITCH_CLASSES: [PitchClass; NUM_STRINGS] = [
    PitchClass::E,
    PitchClass::B,
    PitchClass::G,
    PitchClass::D,
    PitchClass::A,
    PitchClass::E,
];

/// Returned for a string index off the board (A4).
pub const FALLBACK_FREQUENCY: f64 = 440.0;

static FALLBACKS: AtomicU64 = AtomicU64::new(0);

/// Number of times [`frequency_of`] or [`note_name_of`] fell back since
/// process start.
pub fn fallback_count() -> u64 {
    FALLBACKS.load(Ordering::Relaxed)
}

fn record_fallback(string: usize) {
    FALLBACKS.fetch_add(1, Ordering::Relaxed);
    log::warn!("string index {string} is off the fretboard; using A4 fallback");
}

/// Frequency of `fret` on `string`: `open * 2^(fret/12)`.
///
/// Never fails. A string index outside the board yields
/// [`FALLBACK_FREQUENCY`] and is logged and counted.
pub fn frequency_of(string: usize, fret: u32) -> f64 {
    match OPEN_FREQUENCIES.get(string) {
        Some(open) => open * 2f64.powf(fret as f64 / 12.0),
        None => {
            record_fallback(string);
            FALLBACK_FREQUENCY
        }
    }
}

/// Frequency of a recorded note.
pub fn note_frequency(note: &Note) -> f64 {
    frequency_of(note.string() as usize, note.fret() as u32)
}

/// The twelve pitch classes, sharps only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    pub const fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl std::fmt::Display for PitchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pitch class sounding at `fret` on `string`.
///
/// Off-board strings fall back to A, matching [`frequency_of`].
pub fn note_name_of(string: usize, fret: u32) -> PitchClass {
    match OPEN_PITCH_CLASSES.get(string) {
        Some(open) => PitchClass::from_index(open.index() + fret as usize),
        None => {
            record_fallback(string);
            PitchClass::A
        }
    }
}

/// Interval above a base note, folded into one octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Root,
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    DiminishedFifth,
    PerfectFifth,
    MinorSixth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
}

impl Interval {
    const ALL: [Interval; 12] = [
        Interval::Root,
        Interval::MinorSecond,
        Interval::MajorSecond,
        Interval::MinorThird,
        Interval::MajorThird,
        Interval::PerfectFourth,
        Interval::DiminishedFifth,
        Interval::PerfectFifth,
        Interval::MinorSixth,
        Interval::MajorSixth,
        Interval::MinorSeventh,
        Interval::MajorSeventh,
    ];

    pub fn from_semitones(semitones: usize) -> Self {
        Self::ALL[semitones % 12]
    }

    pub fn semitones(self) -> usize {
        self as usize
    }

    /// Short label: "Root", "m3", "P5", ...
    pub const fn name(self) -> &'static str {
        match self {
            Interval::Root => "Root",
            Interval::MinorSecond => "m2",
            Interval::MajorSecond => "M2",
            Interval::MinorThird => "m3",
            Interval::MajorThird => "M3",
            Interval::PerfectFourth => "P4",
            Interval::DiminishedFifth => "d5",
            Interval::PerfectFifth => "P5",
            Interval::MinorSixth => "m6",
            Interval::MajorSixth => "M6",
            Interval::MinorSeventh => "m7",
            Interval::MajorSeventh => "M7",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Interval of `note` above `base`, ignoring octaves.
pub fn interval_of(note: &Note, base: &Note) -> Interval {
    let pc = note_name_of(note.string() as usize, note.fret() as u32).index();
    let base_pc = note_name_of(base.string() as usize, base.fret() as u32).index();
    Interval::from_semitones(pc + 12 - base_pc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::{duration::NoteDuration, note::NUM_FRETS};

    fn note(string: usize, fret: usize) -> Note {
        Note::played(string, fret, NoteDuration::Quarter).unwrap()
    }

    #[test]
    fn test_open_strings() {
        assert!((frequency_of(0, 0) - 329.63).abs() < 1e-9);
        assert!((frequency_of(5, 0) - 82.41).abs() < 1e-9);
    }

    #[test]
    fn test_octave_doubles_frequency() {
        for string in 0..NUM_STRINGS {
            for fret in 0..(NUM_FRETS - 12) as u32 {
                let low = frequency_of(string, fret);
                let high = frequency_of(string, fret + 12);
                assert!((high - 2.0 * low).abs() < 1e-9, "string {string} fret {fret}");
            }
        }
    }

    #[test]
    fn test_off_board_string_falls_back() {
        let before = fallback_count();
        assert_eq!(frequency_of(6, 3), FALLBACK_FREQUENCY);
        assert_eq!(note_name_of(9, 0), PitchClass::A);
        assert!(fallback_count() >= before + 2);
    }

    #[test]
    fn test_note_names() {
        assert_eq!(note_name_of(0, 0), PitchClass::E);
        assert_eq!(note_name_of(4, 3), PitchClass::C);
        assert_eq!(note_name_of(1, 1), PitchClass::C);
        assert_eq!(note_name_of(5, 12), PitchClass::E);
        assert_eq!(note_name_of(2, 1).to_string(), "G#");
    }

    #[test]
    fn test_intervals() {
        // C on the A string, E on the high E string
        let c = note(4, 3);
        assert_eq!(interval_of(&note(0, 0), &c), Interval::MajorThird);
        assert_eq!(interval_of(&c, &c), Interval::Root);
        // G below C folds to a perfect fifth above
        assert_eq!(interval_of(&note(2, 0), &c).to_string(), "P5");
        assert_eq!(interval_of(&c, &note(2, 0)), Interval::PerfectFourth);
    }
}
