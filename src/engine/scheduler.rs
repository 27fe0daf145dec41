//! Musical time to absolute time.
//!
//! A [`Schedule`] is computed once per playback run from a single origin.
//! Step `i` starts at exactly `i * seconds_per_step`; nothing is derived from
//! the previous step's actual firing time, so late callbacks or uneven audio
//! blocks never accumulate into drift.

use crate::engine::config::TransportConfig;
use crate::error::StateError;
use crate::sequencing::{
    note::{Note, Step},
    strum,
};
use crate::tuning;

/// One sounding note with its absolute on/off times, in seconds from the
/// start of the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    pub step: usize,
    pub note: Note,
    pub frequency: f64,
    pub on: f64,
    pub off: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub seconds_per_step: f64,
    /// Start of every step, in step order.
    pub step_starts: Vec<f64>,
    /// Sounding notes, grouped by step in step order, strum order within.
    pub notes: Vec<ScheduledNote>,
    /// Seconds until the last step has run out and every note has ended.
    pub length: f64,
}

impl Schedule {
    /// Lay out `steps` with `config`.
    ///
    /// Rests keep their strum slot but produce no entry: silence is the
    /// absence of events, not an event.
    pub fn build(steps: &[Step], config: &TransportConfig) -> Result<Self, StateError> {
        if steps.is_empty() {
            return Err(StateError::EmptySequence);
        }

        let seconds_per_step = config.seconds_per_step();
        let seconds_per_beat = config.seconds_per_beat();
        let mut step_starts = Vec::with_capacity(steps.len());
        let mut notes = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            let start = index as f64 * seconds_per_step;
            step_starts.push(start);

            let order = strum::order(step.notes(), step.strum(), config.strum_delay);
            for (offset, note) in order.timed() {
                if note.is_rest {
                    continue;
                }
                let on = start + offset;
                notes.push(ScheduledNote {
                    step: index,
                    note: *note,
                    frequency: tuning::note_frequency(note),
                    on,
                    off: on + seconds_per_beat * note.duration.factor(),
                });
            }
        }

        let last_start = step_starts.last().copied().unwrap_or(0.0);
        let length = notes
            .iter()
            .map(|n| n.off)
            .fold(last_start + seconds_per_step, f64::max);

        log::debug!(
            "scheduled {} steps, {} notes, {:.3}s",
            steps.len(),
            notes.len(),
            length
        );

        Ok(Self {
            seconds_per_step,
            step_starts,
            notes,
            length,
        })
    }

    /// A single note starting now, for auditioning a selection.
    pub fn single(note: &Note, config: &TransportConfig) -> Self {
        let off = config.seconds_per_beat() * note.duration.factor();
        let notes = if note.is_rest {
            Vec::new()
        } else {
            vec![ScheduledNote {
                step: 0,
                note: *note,
                frequency: tuning::note_frequency(note),
                on: 0.0,
                off,
            }]
        };
        Self {
            seconds_per_step: config.seconds_per_step(),
            step_starts: vec![0.0],
            notes,
            length: off,
        }
    }
}

/// Seconds to the nearest whole frame.
pub fn to_frames(seconds: f64, sample_rate: f32) -> u64 {
    (seconds * sample_rate as f64).round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::{
        duration::NoteDuration,
        note::StrumDirection,
        time_signature::TimeSignature,
    };

    fn step(notes: &[(usize, usize)], strum: StrumDirection) -> Step {
        let notes = notes
            .iter()
            .map(|&(s, f)| Note::played(s, f, NoteDuration::Quarter).unwrap())
            .collect();
        Step::new(notes, strum).unwrap()
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let err = Schedule::build(&[], &TransportConfig::default()).unwrap_err();
        assert_eq!(err, StateError::EmptySequence);
    }

    #[test]
    fn test_two_quarter_notes_at_120() {
        let steps = [
            step(&[(0, 0)], StrumDirection::Down),
            step(&[(5, 3)], StrumDirection::Down),
        ];
        let schedule = Schedule::build(&steps, &TransportConfig::default()).unwrap();

        assert!((schedule.seconds_per_step - 0.5).abs() < 1e-12);
        let times: Vec<(f64, f64)> = schedule.notes.iter().map(|n| (n.on, n.off)).collect();
        assert_eq!(times.len(), 2);
        assert!((times[0].0 - 0.0).abs() < 1e-12 && (times[0].1 - 0.5).abs() < 1e-12);
        assert!((times[1].0 - 0.5).abs() < 1e-12 && (times[1].1 - 1.0).abs() < 1e-12);
        assert!((schedule.length - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_starts_have_no_drift() {
        let steps: Vec<Step> = (0..500)
            .map(|i| step(&[(i % 6, 0)], StrumDirection::Down))
            .collect();
        let config = TransportConfig::default().with_tempo(97.0).unwrap();
        let schedule = Schedule::build(&steps, &config).unwrap();
        let sps = config.seconds_per_step();
        assert_eq!(schedule.step_starts[499], 499.0 * sps);
    }

    #[test]
    fn test_strum_offsets_within_step() {
        let steps = [step(&[(0, 0), (2, 2), (4, 2)], StrumDirection::Down)];
        let schedule = Schedule::build(&steps, &TransportConfig::default()).unwrap();
        let order: Vec<(u8, f64)> = schedule
            .notes
            .iter()
            .map(|n| (n.note.string(), n.on))
            .collect();
        assert_eq!(order[0].0, 4);
        assert_eq!(order[2].0, 0);
        assert!((order[1].1 - 0.020).abs() < 1e-12);
        assert!((order[2].1 - 0.040).abs() < 1e-12);
    }

    #[test]
    fn test_rests_make_no_events_but_keep_slot() {
        let notes = vec![
            Note::played(0, 0, NoteDuration::Quarter).unwrap(),
            Note::rest(1, 0, NoteDuration::Quarter).unwrap(),
            Note::played(2, 0, NoteDuration::Quarter).unwrap(),
        ];
        let steps = [Step::new(notes, StrumDirection::Up).unwrap()];
        let schedule = Schedule::build(&steps, &TransportConfig::default()).unwrap();
        assert_eq!(schedule.notes.len(), 2);
        assert!((schedule.notes[1].on - 0.040).abs() < 1e-12);
    }

    #[test]
    fn test_duration_and_time_signature() {
        let notes = vec![Note::played(0, 0, NoteDuration::Whole).unwrap()];
        let steps = [Step::new(notes, StrumDirection::Down).unwrap()];
        let config = TransportConfig::default().with_time_signature(TimeSignature::SIX_EIGHT);
        let schedule = Schedule::build(&steps, &config).unwrap();
        // Whole note: 4 beats of 0.5 s; the 6/8 step is 1 s
        assert!((schedule.notes[0].off - 2.0).abs() < 1e-12);
        assert!((schedule.seconds_per_step - 1.0).abs() < 1e-12);
        assert!((schedule.length - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_rest_is_silent() {
        let rest = Note::rest(0, 0, NoteDuration::Half).unwrap();
        let schedule = Schedule::single(&rest, &TransportConfig::default());
        assert!(schedule.notes.is_empty());
    }

    #[test]
    fn test_to_frames_rounds() {
        assert_eq!(to_frames(0.5, 48_000.0), 24_000);
        assert_eq!(to_frames(0.020, 44_100.0), 882);
    }
}
