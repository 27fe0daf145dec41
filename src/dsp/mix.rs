//! Summing and blending buffers.
//!
//! Voices are summed into one output bus, so the bus can exceed ±1.0 when
//! several strings ring together. [`soft_limit`] tames the sum smoothly
//! rather than clipping it at the sink.

/// Add `source` into `bus`, scaled by `gain`.
pub fn accumulate(bus: &mut [f32], source: &[f32], gain: f32) {
    debug_assert_eq!(bus.len(), source.len());
    for (b, &s) in bus.iter_mut().zip(source.iter()) {
        *b += s * gain;
    }
}

/// Blend processed (`wet`) with unprocessed (`dry`) signal, in place on `wet`.
///
/// wet[i] = dry[i] * (1 - mix) + wet[i] * mix
pub fn apply_dry_wet(dry: &[f32], wet: &mut [f32], mix: f32) {
    debug_assert_eq!(dry.len(), wet.len());

    let mix = mix.clamp(0.0, 1.0);
    if mix >= 1.0 {
        return;
    }

    let dry_amount = 1.0 - mix;
    for (w, &d) in wet.iter_mut().zip(dry.iter()) {
        *w = d * dry_amount + *w * mix;
    }
}

/// Transparent below `knee`, then bends the sample asymptotically toward ±1.
#[inline]
pub fn soft_limit_sample(sample: f32, knee: f32) -> f32 {
    let magnitude = sample.abs();
    if magnitude <= knee {
        return sample;
    }
    let headroom = 1.0 - knee;
    let excess = magnitude - knee;
    let limited = knee + headroom * (excess / (excess + headroom));
    limited.copysign(sample)
}

/// Apply [`soft_limit_sample`] to a buffer. Non-finite samples become silence.
pub fn soft_limit(buffer: &mut [f32], knee: f32) {
    for sample in buffer.iter_mut() {
        *sample = if sample.is_finite() {
            soft_limit_sample(*sample, knee)
        } else {
            0.0
        };
    }
}
