//! Benchmarks for complete per-note chains.
//!
//! These are the graphs the transport builds for every scheduled note:
//! oscillator, then the enabled effects, then the gain envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fretstep::dsp::distortion::ShaperMode;
use fretstep::effects::{bend::PitchBend, default_chain, distortion::ShaperNode, BendParams};
use fretstep::engine::{Schedule, TransportConfig, Voice};
use fretstep::graph::{
    envelope::EnvNode,
    extensions::NodeExt,
    node::{GraphNode, RenderCtx},
    oscillator::OscNode,
};
use fretstep::sequencing::{Note, NoteDuration};
use fretstep::MAX_BLOCK_SIZE;

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    // A string, fifth fret
    let ctx = RenderCtx::from_freq(48_000.0, 146.83, 0.5);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === CLEAN ===
        // Both effects disabled: oscillator → envelope
        let mut clean = OscNode::sine().amplify(EnvNode::new(0.005, 0.05));
        clean.note_on(&ctx);
        group.bench_with_input(BenchmarkId::new("clean", size), &size, |b, _| {
            b.iter(|| {
                clean.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === DISTORTED ===
        // oscillator → waveshaper (half wet) → envelope
        let mut distorted = OscNode::sawtooth()
            .through(ShaperNode::new(ShaperMode::Curve, 40.0, 0.5))
            .amplify(EnvNode::new(0.005, 0.05));
        distorted.note_on(&ctx);
        group.bench_with_input(BenchmarkId::new("distorted", size), &size, |b, _| {
            b.iter(|| {
                distorted.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === VIBRATO ===
        // Bend with vibrato re-pitches the oscillator every control block
        let params = BendParams {
            vibrato: true,
            ..BendParams::default()
        };
        let mut vibrato = PitchBend::new(OscNode::sine(), params).amplify(EnvNode::new(0.005, 0.05));
        vibrato.note_on(&ctx);
        group.bench_with_input(BenchmarkId::new("vibrato", size), &size, |b, _| {
            b.iter(|| {
                vibrato.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === FULL CHAIN ===
        // A voice built the way the transport builds it, both effects on
        let mut chain = default_chain();
        let _ = chain.set_enabled("distortion", true);
        let _ = chain.set_enabled("bend", true);
        let config = TransportConfig::default();
        let note = Note::played(3, 5, NoteDuration::Whole).expect("valid note");
        let schedule = Schedule::single(&note, &config);
        let mut voice = Voice::build(1, &schedule.notes[0], &config, &mut chain, 48_000.0);
        voice.start();
        let mut scratch = vec![0.0f32; MAX_BLOCK_SIZE];
        group.bench_with_input(BenchmarkId::new("full_chain", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                voice.render_into(black_box(&mut buffer), &mut scratch);
            })
        });
    }

    group.finish();
}
