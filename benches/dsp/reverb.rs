//! Benchmarks for the Schroeder reverb.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonal_graph::dsp::reverb::SchroederReverb;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| if i % 64 == 0 { 1.0 } else { 0.0 }).collect();
        let mut buffer = input.clone();

        for (name, room_size, density) in [("small_room", 0.3, 0.5), ("hall", 1.0, 1.0)] {
            let mut reverb = SchroederReverb::new(SAMPLE_RATE, room_size, 0);
            reverb.set_decay_time(1.5);
            reverb.set_density(density);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (out, &x) in buffer.iter_mut().zip(&input) {
                        *out = reverb.process(black_box(x));
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
