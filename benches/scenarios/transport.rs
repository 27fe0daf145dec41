//! Benchmarks for scheduling and offline transport runs.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fretstep::effects::default_chain;
use fretstep::engine::{Schedule, Transport, TransportConfig};
use fretstep::sequencing::{Note, NoteDuration, Step, StrumDirection};

/// A strummed six-string chord per step, alternating direction.
fn song(steps: usize) -> Vec<Step> {
    let shape = [0usize, 1, 0, 2, 3, 0];
    (0..steps)
        .map(|i| {
            let notes = shape
                .iter()
                .enumerate()
                .map(|(string, &fret)| {
                    Note::played(string, fret + i % 3, NoteDuration::Quarter).expect("valid note")
                })
                .collect();
            let strum = if i % 2 == 0 {
                StrumDirection::Down
            } else {
                StrumDirection::Up
            };
            Step::new(notes, strum).expect("valid step")
        })
        .collect()
}

pub fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/schedule");
    let config = TransportConfig::default();

    for steps in [16usize, 128, 1024] {
        let song = song(steps);
        group.bench_with_input(BenchmarkId::new("build", steps), &steps, |b, _| {
            b.iter(|| Schedule::build(black_box(&song), black_box(&config)))
        });
    }

    group.finish();
}

pub fn bench_transport(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/transport");
    let config = TransportConfig::default();
    let song = song(8);

    // One second of a strummed song: scheduling plus rendering
    for block in [128usize, 512] {
        group.bench_with_input(BenchmarkId::new("one_second", block), &block, |b, &block| {
            let mut out = vec![0.0f32; block];
            b.iter(|| {
                let mut chain = default_chain();
                let _ = chain.set_enabled("distortion", true);
                let mut transport = Transport::new(48_000.0).expect("valid sample rate");
                transport
                    .play(&song, &config, &mut chain)
                    .expect("non-empty song");
                for _ in 0..(48_000 / block) {
                    transport.render_block(black_box(&mut out));
                }
            })
        });
    }

    group.finish();
}
