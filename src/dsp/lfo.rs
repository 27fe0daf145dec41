//! Control-rate modulation for pitch effects.

/*
Pitch Modulation
================

Bends and vibrato move the oscillator's frequency rather than its output
samples. Both are expressed in semitones and turned into a frequency
ratio at the last moment:

    ratio = 2^(semitones / 12)

    semitones   ratio
      -12       0.5     (octave down)
        0       1.0
        1       1.0595
        2       1.1225  (whole-step bend)
       12       2.0

Vibrato is a sine LFO, a few Hz, swinging the pitch above and below its
centre by `depth` semitones:

    offset(t) = depth * sin(2π * rate * t)

A bend is a ramp in semitone space: flat until a delay has passed, then
linear up to the target over the bend time, then held. Ramping in
semitones (not Hz) makes the glide sound even from start to finish.

    semis
     target ┤             ┌────────────
            │            ╱
            │           ╱
          0 ┼──────────┘
             |  delay  | bend time |

Both functions below are evaluated per control block, not per sample.
At typical block sizes the step between blocks is far below a cent.
*/

use std::f32::consts::TAU;

/// Frequency ratio for a pitch offset in semitones.
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    2.0_f32.powf(semitones / 12.0)
}

/// Sine vibrato offset, in semitones, at `elapsed` seconds into the note.
#[inline]
pub fn vibrato_offset(elapsed: f32, rate_hz: f32, depth_semitones: f32) -> f32 {
    depth_semitones * (TAU * rate_hz * elapsed).sin()
}

/// Bend amount, in semitones, at `elapsed` seconds into the note.
///
/// Zero before `delay`, a linear ramp over `bend_time`, then `target`.
/// A zero bend time jumps straight to the target.
#[inline]
pub fn bend_offset(elapsed: f32, delay: f32, bend_time: f32, target: f32) -> f32 {
    if elapsed < delay {
        return 0.0;
    }
    if bend_time <= 0.0 {
        return target;
    }
    let progress = ((elapsed - delay) / bend_time).min(1.0);
    target * progress
}
