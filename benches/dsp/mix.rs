//! Benchmarks for bus mixing and limiting.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fretstep::dsp::mix;

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let signal_a: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let signal_b: Vec<f32> = (0..size).map(|i| (i as f32 * 0.15).cos()).collect();

        // Voice into bus
        let mut bus = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("accumulate", size), &size, |b, _| {
            b.iter(|| {
                bus.fill(0.0);
                mix::accumulate(black_box(&mut bus), black_box(&signal_a), black_box(0.5));
            })
        });

        // Dry/wet mixing (common for effects)
        let mut wet = signal_b.clone();
        group.bench_with_input(BenchmarkId::new("dry_wet", size), &size, |b, _| {
            b.iter(|| {
                wet.copy_from_slice(&signal_b);
                mix::apply_dry_wet(black_box(&signal_a), black_box(&mut wet), black_box(0.3));
            })
        });

        // Output limiter on a hot bus
        let hot: Vec<f32> = signal_a.iter().zip(&signal_b).map(|(a, b)| (a + b) * 1.5).collect();
        let mut buffer = hot.clone();
        group.bench_with_input(BenchmarkId::new("soft_limit", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&hot);
                mix::soft_limit(black_box(&mut buffer), black_box(0.8));
            })
        });
    }

    group.finish();
}
