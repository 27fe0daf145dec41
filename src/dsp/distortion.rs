//! Waveshaping transfer functions.
//!
//! Every function here maps one input sample to one output sample with no
//! state, so a shaper can run per sample inside any node. `amount` is the
//! user-facing 0..100 control; the clip modes turn it into a drive factor
//! with [`drive_from_amount`].
//!
//! Curve (the classic browser waveshaper):
//!   f(x) = (3 + k) * x * 20° / (π + k * |x|)
//!   - k = 0 scales the signal to a third, no harmonics
//!   - rising k squares the wave off progressively
//!
//! Soft clip:    f(x) = x / (1 + |x|)
//! Hard clip:    f(x) = clamp(x, -t, t)
//! Foldback:     reflect x back inside [-t, t] until it fits

use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Upper end of the `amount` control.
pub const MAX_AMOUNT: f32 = 100.0;

/// Threshold used by the clip and fold modes.
pub const CLIP_THRESHOLD: f32 = 0.8;

const DEGREE: f32 = PI / 180.0;

/// Transfer function selected by a distortion unit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShaperMode {
    #[default]
    Curve,
    Soft,
    Hard,
    Foldback,
}

impl ShaperMode {
    pub const fn name(self) -> &'static str {
        match self {
            ShaperMode::Curve => "curve",
            ShaperMode::Soft => "soft",
            ShaperMode::Hard => "hard",
            ShaperMode::Foldback => "foldback",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "curve" => Some(ShaperMode::Curve),
            "soft" => Some(ShaperMode::Soft),
            "hard" => Some(ShaperMode::Hard),
            "foldback" => Some(ShaperMode::Foldback),
            _ => None,
        }
    }

    /// Shape one sample with the 0..100 `amount` control.
    #[inline]
    pub fn apply(self, sample: f32, amount: f32) -> f32 {
        match self {
            ShaperMode::Curve => curve(sample, amount),
            ShaperMode::Soft => soft_clip(sample, drive_from_amount(amount)),
            ShaperMode::Hard => hard_clip(sample, drive_from_amount(amount), CLIP_THRESHOLD),
            ShaperMode::Foldback => foldback(sample, drive_from_amount(amount), CLIP_THRESHOLD),
        }
    }
}

/// Map the 0..100 control onto a 1..11 drive factor.
#[inline]
pub fn drive_from_amount(amount: f32) -> f32 {
    1.0 + amount.clamp(0.0, MAX_AMOUNT) / 10.0
}

/// `(3 + k) * x * 20° / (π + k|x|)`, with `k` the amount.
#[inline]
pub fn curve(sample: f32, amount: f32) -> f32 {
    let k = amount.clamp(0.0, MAX_AMOUNT);
    (3.0 + k) * sample * 20.0 * DEGREE / (PI + k * sample.abs())
}

#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

#[inline]
pub fn hard_clip(sample: f32, drive: f32, threshold: f32) -> f32 {
    (sample * drive).clamp(-threshold, threshold)
}

/// Reflect the driven sample back into `[-threshold, threshold]`.
#[inline]
pub fn foldback(sample: f32, drive: f32, threshold: f32) -> f32 {
    let x = sample * drive;
    if !x.is_finite() || threshold <= 0.0 {
        return 0.0;
    }
    // Triangle fold with period 4t, evaluated directly
    let period = 4.0 * threshold;
    let shifted = (x + threshold).rem_euclid(period);
    if shifted < 2.0 * threshold {
        shifted - threshold
    } else {
        3.0 * threshold - shifted
    }
}

/// Shape a whole buffer in place.
pub fn shape_buffer(buffer: &mut [f32], mode: ShaperMode, amount: f32) {
    for sample in buffer.iter_mut() {
        *sample = mode.apply(*sample, amount);
    }
}
