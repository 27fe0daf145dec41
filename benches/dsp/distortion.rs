//! Benchmarks for the waveshaper modes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fretstep::dsp::distortion::{self, ShaperMode};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sine-like values)
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for mode in [
            ShaperMode::Curve,
            ShaperMode::Soft,
            ShaperMode::Hard,
            ShaperMode::Foldback,
        ] {
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(mode.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    distortion::shape_buffer(black_box(&mut buffer), mode, black_box(40.0));
                })
            });
        }
    }

    group.finish();
}
