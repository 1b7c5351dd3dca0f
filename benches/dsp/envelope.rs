//! Benchmarks for the ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonal_graph::dsp::envelope::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::adsr(0.1, 0.1, 0.7, 0.3);
        env.trigger(false);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(black_box(SAMPLE_RATE));
                }
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3);
        env.trigger(false);
        for _ in 0..200 {
            env.next_sample(SAMPLE_RATE);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(black_box(SAMPLE_RATE));
                }
            })
        });

        // Release phase (ramping down)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 10.0);
        env.trigger(false);
        for _ in 0..200 {
            env.next_sample(SAMPLE_RATE);
        }
        env.release(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = env.next_sample(black_box(SAMPLE_RATE));
                }
            })
        });
    }

    group.finish();
}
