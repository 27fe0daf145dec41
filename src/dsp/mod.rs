//! Low-level DSP primitives used by the graph nodes.
//!
//! Everything here is allocation-free and realtime-safe, so it can sit
//! directly inside a voice. The modules stay focused on signal math; the
//! graph layer adds note events and block orchestration.

/// Waveshaping transfer functions.
pub mod distortion;
/// Attack/release gate envelope.
pub mod envelope;
/// Pitch bend and vibrato curves.
pub mod lfo;
/// Bus summing, dry/wet blending and the output limiter.
pub mod mix;
/// Periodic waveforms.
pub mod oscillator;

pub use envelope::EnvelopeState;
pub use oscillator::Waveform;
