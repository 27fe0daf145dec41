//! Error taxonomy for the sequencer core.
//!
//! Four kinds of failure reach callers, and none of them crash the process:
//!
//! - [`ValidationError`]: a note, step, config value or imported file has the
//!   wrong shape. Rejected at the boundary, never partially applied.
//! - [`StateError`]: the operation is not valid right now (no current step,
//!   nothing to play, already playing).
//! - [`ResourceError`]: the audio sink cannot be used.
//! - [`PluginError`]: an effect unit misbehaved or was misused.
//!
//! Navigating past either end of the sequence is *not* an error; see
//! [`Boundary`].

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure surfaced by the sequencer core.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error(transparent)]
    Boundary(#[from] Boundary),
}

/// Bad note, step, config or file shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("string index {0} is out of range (0-5)")]
    StringOutOfRange(usize),
    #[error("fret {fret} is out of range (0-{max})")]
    FretOutOfRange { fret: usize, max: usize },
    #[error("no notes selected")]
    EmptyStep,
    #[error("note on string {string}, fret {fret} appears twice in one step")]
    DuplicateNote { string: u8, fret: u8 },
    #[error("tempo must be a finite number above zero, got {0}")]
    InvalidTempo(f64),
    #[error("time signature {beats_per_measure}/{beat_unit} is invalid")]
    InvalidTimeSignature { beats_per_measure: u32, beat_unit: u32 },
    #[error("unknown note duration '{0}'")]
    UnknownDuration(String),
    #[error("unknown strum direction '{0}'")]
    UnknownStrum(String),
    #[error("step {index} is invalid: {source}")]
    InvalidStep {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
    #[error("song file is malformed: {0}")]
    MalformedSong(String),
}

/// Operation not valid in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no setup selected to update")]
    NoCurrentStep,
    #[error("no setups recorded")]
    EmptySequence,
    #[error("playback is already running")]
    AlreadyPlaying,
}

/// Audio sink problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    #[error("sample rate must be finite and above zero, got {0}")]
    InvalidSampleRate(f32),
    #[error("audio output is closed")]
    SinkClosed,
}

/// Effect unit failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PluginError {
    #[error("an effect named '{0}' is already installed")]
    DuplicateName(String),
    #[error("no effect named '{0}' is installed")]
    UnknownEffect(String),
    #[error("effect '{name}' failed to initialise: {reason}")]
    InitFailed { name: String, reason: String },
    #[error("effect '{name}' failed while processing: {reason}")]
    ProcessFailed { name: String, reason: String },
    #[error("setting '{key}' of effect '{name}' is invalid: {reason}")]
    InvalidSetting {
        name: String,
        key: String,
        reason: String,
    },
    #[error("effect '{0}' has no per-note settings")]
    NoteSettingsUnsupported(String),
}

/// Navigation hit the edge of the sequence. The cursor is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Boundary {
    #[error("No previous step.")]
    NoPreviousStep,
    #[error("No next step.")]
    NoNextStep,
    #[error("Step {requested} does not exist ({len} recorded).")]
    OutOfRange { requested: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_step_error_names_the_step() {
        let err = ValidationError::InvalidStep {
            index: 3,
            source: Box::new(ValidationError::DuplicateNote { string: 2, fret: 5 }),
        };
        let msg = err.to_string();
        assert!(msg.contains("step 3"), "{msg}");
        assert!(msg.contains("string 2, fret 5"), "{msg}");
    }

    #[test]
    fn test_kinds_convert_into_crate_error() {
        let err: Error = StateError::NoCurrentStep.into();
        assert!(matches!(err, Error::State(StateError::NoCurrentStep)));

        let err: Error = Boundary::NoNextStep.into();
        assert_eq!(err.to_string(), "No next step.");
    }
}
