use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
Periodic Oscillator
===================

A phase accumulator driving a waveform function. Phase runs over [0, 1):
each sample reads the waveform at the current phase, then advances it by
frequency / sample_rate and wraps.

      phase   0 ─────────── 0.25 ─────────── 0.5 ─────────── 0.75 ──────── 1
      sine    0      ↗       1       ↘        0       ↘      -1     ↗      0
      saw    -1  ──────────────────────────── 0 ─────────────────────────→ 1
      square  1  ───────────────────────────  -1 ───────────────────────── -1
      tri    -1      ↗        0       ↗       1       ↘       0     ↘     -1

Frequency is read from the render context on every block, so a node
upstream may sweep pitch between blocks (bends, vibrato) without phase
discontinuities: only the increment changes, the phase carries over.

The waveforms are naive (not band-limited). Guitar-range fundamentals at
44.1/48 kHz keep aliasing well below audibility for the saw and square.
*/

/// Waveform produced by an [`OscillatorBlock`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ];

    /// Sample of the waveform at `phase` in [0, 1).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|w| *w == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }
}

/// Phase-accumulating oscillator. Allocation free.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Saw)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Restart the cycle at phase zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Fill `out` with the waveform at `ctx.frequency`.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let increment = ctx.frequency / ctx.sample_rate;
        for sample in out.iter_mut() {
            *sample = self.waveform.sample(self.phase);
            self.phase += increment;
            self.phase -= self.phase.floor();
        }
    }
}
