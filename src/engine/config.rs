#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::error::ValidationError;
use crate::sequencing::{strum::DEFAULT_STRUM_DELAY, time_signature::TimeSignature};

pub const DEFAULT_TEMPO: f64 = 120.0;
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Attack and release of every note's gain envelope, in seconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub attack: f32,
    pub release: f32,
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            attack: 0.005,
            release: 0.05,
        }
    }
}

/// Everything that shapes a playback run. Snapshotted by
/// [`Transport::play`](super::Transport::play), so edits only affect the
/// next run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportConfig {
    tempo_bpm: f64,
    pub time_signature: TimeSignature,
    volume: f32,
    /// Seconds between strings within a strum.
    pub strum_delay: f64,
    pub waveform: Waveform,
    pub envelope: EnvelopeShape,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tempo_bpm: DEFAULT_TEMPO,
            time_signature: TimeSignature::FOUR_FOUR,
            volume: DEFAULT_VOLUME,
            strum_delay: DEFAULT_STRUM_DELAY,
            waveform: Waveform::Sine,
            envelope: EnvelopeShape::default(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_tempo`](Self::set_tempo).
    pub fn with_tempo(mut self, bpm: f64) -> Result<Self, ValidationError> {
        self.set_tempo(bpm)?;
        Ok(self)
    }

    pub fn with_time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = time_signature;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    pub fn with_strum_delay(mut self, seconds: f64) -> Self {
        self.strum_delay = seconds.max(0.0);
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_envelope(mut self, envelope: EnvelopeShape) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    /// Set the tempo. Rejects anything that is not a finite number above zero.
    pub fn set_tempo(&mut self, bpm: f64) -> Result<(), ValidationError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(ValidationError::InvalidTempo(bpm));
        }
        self.tempo_bpm = bpm;
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Set the master volume, clamped to [0, 1].
    ///
    /// NaN and infinities are replaced by [`DEFAULT_VOLUME`].
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = sanitize_volume(volume);
    }

    /// Seconds from one step start to the next.
    pub fn seconds_per_step(&self) -> f64 {
        self.time_signature.seconds_per_step(self.tempo_bpm)
    }

    /// Seconds per beat (quarter note = one beat).
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo_bpm
    }
}

/// Clamp `volume` into [0, 1], substituting the default for non-finite input.
pub fn sanitize_volume(volume: f32) -> f32 {
    if !volume.is_finite() {
        log::warn!("volume {volume} is not finite; using {DEFAULT_VOLUME}");
        return DEFAULT_VOLUME;
    }
    if !(0.0..=1.0).contains(&volume) {
        log::warn!("volume {volume} is out of range; clamping to [0, 1]");
    }
    volume.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.tempo_bpm(), 120.0);
        assert_eq!(config.time_signature, TimeSignature::FOUR_FOUR);
        assert_eq!(config.volume(), 0.5);
        assert!((config.seconds_per_step() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_tempo_must_be_positive_and_finite() {
        let mut config = TransportConfig::default();
        for bad in [0.0, -60.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                config.set_tempo(bad),
                Err(ValidationError::InvalidTempo(_))
            ));
        }
        assert_eq!(config.tempo_bpm(), 120.0);
        config.set_tempo(90.0).unwrap();
        assert_eq!(config.tempo_bpm(), 90.0);
    }

    #[test]
    fn test_volume_is_clamped_or_defaulted() {
        let mut config = TransportConfig::default();
        config.set_volume(1.7);
        assert_eq!(config.volume(), 1.0);
        config.set_volume(-0.2);
        assert_eq!(config.volume(), 0.0);
        config.set_volume(f32::NAN);
        assert_eq!(config.volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn test_builder() {
        let config = TransportConfig::new()
            .with_tempo(60.0)
            .unwrap()
            .with_time_signature(TimeSignature::SIX_EIGHT)
            .with_volume(0.8);
        assert!((config.seconds_per_step() - 2.0).abs() < 1e-12);
        assert_eq!(config.volume(), 0.8);
        assert!(TransportConfig::new().with_tempo(0.0).is_err());
    }
}
