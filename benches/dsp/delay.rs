//! Benchmarks for the fractional delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonal_graph::dsp::delay::DelayLine;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();
        let mut buffer = input.clone();

        // Integer delay, half a second
        let mut line = DelayLine::new(SAMPLE_RATE as usize);
        let delay = SAMPLE_RATE * 0.5;
        group.bench_with_input(BenchmarkId::new("fixed", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    *out = line.next_sample(black_box(x), delay);
                }
                black_box(&buffer);
            })
        });

        // Fractional delay with feedback
        let mut line = DelayLine::new(SAMPLE_RATE as usize);
        let delay = SAMPLE_RATE * 0.333 + 0.5;
        group.bench_with_input(BenchmarkId::new("feedback", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    let wet = line.read(delay);
                    line.write(x + wet * 0.4);
                    *out = x + wet * 0.5;
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
