//! Fretted notes and the steps (setups) they are grouped into.

use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::duration::NoteDuration;
use crate::error::ValidationError;

/// Number of strings on the fretboard. String 0 is the high E.
pub const NUM_STRINGS: usize = 6;
/// Number of frets per string, open string included.
pub const NUM_FRETS: usize = 24;

/// One selected position on the fretboard.
///
/// Identity is the (string, fret) pair: two notes on the same position are
/// equal even if their duration or rest flag differ, because those describe
/// one occurrence rather than the position itself.
#[derive(Debug, Clone, Copy)]
pub struct Note {
    string: u8,
    fret: u8,
    pub duration: NoteDuration,
    pub is_rest: bool,
}

impl Note {
    /// Create a note, rejecting positions off the fretboard.
    pub fn new(
        string: usize,
        fret: usize,
        duration: NoteDuration,
        is_rest: bool,
    ) -> Result<Self, ValidationError> {
        if string >= NUM_STRINGS {
            return Err(ValidationError::StringOutOfRange(string));
        }
        if fret >= NUM_FRETS {
            return Err(ValidationError::FretOutOfRange {
                fret,
                max: NUM_FRETS - 1,
            });
        }
        Ok(Self {
            string: string as u8,
            fret: fret as u8,
            duration,
            is_rest,
        })
    }

    /// A sounding note.
    pub fn played(string: usize, fret: usize, duration: NoteDuration) -> Result<Self, ValidationError> {
        Self::new(string, fret, duration, false)
    }

    /// A rest occupying this position's slot.
    pub fn rest(string: usize, fret: usize, duration: NoteDuration) -> Result<Self, ValidationError> {
        Self::new(string, fret, duration, true)
    }

    pub fn string(&self) -> u8 {
        self.string
    }

    pub fn fret(&self) -> u8 {
        self.fret
    }

    /// The (string, fret) identity.
    pub fn key(&self) -> (u8, u8) {
        (self.string, self.fret)
    }

    /// Same position, every attribute equal too.
    pub fn same_occurrence(&self, other: &Note) -> bool {
        self == other && self.duration == other.duration && self.is_rest == other.is_rest
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Order in which the strings of a step are struck.
///
/// Up fires in ascending string index (high E first), down the reverse.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrumDirection {
    Up,
    #[default]
    Down,
}

impl StrumDirection {
    pub fn toggled(self) -> Self {
        match self {
            StrumDirection::Up => StrumDirection::Down,
            StrumDirection::Down => StrumDirection::Up,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StrumDirection::Up => "up",
            StrumDirection::Down => "down",
        }
    }
}

impl std::fmt::Display for StrumDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for StrumDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(StrumDirection::Up),
            "down" => Ok(StrumDirection::Down),
            _ => Err(ValidationError::UnknownStrum(s.to_string())),
        }
    }
}

/// A recorded setup: distinct notes struck together, plus the strum
/// direction captured when it was recorded.
///
/// Steps are immutable once built; updating a step replaces it whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    notes: Vec<Note>,
    strum: StrumDirection,
}

impl Step {
    /// Build a step. Rejects an empty note list and repeated positions.
    pub fn new(notes: Vec<Note>, strum: StrumDirection) -> Result<Self, ValidationError> {
        if notes.is_empty() {
            return Err(ValidationError::EmptyStep);
        }
        for (i, note) in notes.iter().enumerate() {
            if notes[..i].contains(note) {
                return Err(ValidationError::DuplicateNote {
                    string: note.string,
                    fret: note.fret,
                });
            }
        }
        Ok(Self { notes, strum })
    }

    /// Notes in the order they were selected.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn strum(&self) -> StrumDirection {
        self.strum
    }

    /// Notes that produce sound.
    pub fn sounding(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| !n.is_rest)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Fret played on `string`, if any (first match).
    pub fn fret_on(&self, string: u8) -> Option<&Note> {
        self.notes.iter().find(|n| n.string == string)
    }
}
