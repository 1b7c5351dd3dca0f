//! Benchmarks for the phase-accumulating oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonal_graph::dsp::oscillator::OscillatorBlock;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, mut osc) in [
            ("sine", OscillatorBlock::sine()),
            ("saw", OscillatorBlock::sawtooth()),
            ("square", OscillatorBlock::square()),
            ("triangle", OscillatorBlock::triangle()),
        ] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next_sample(black_box(440.0), SAMPLE_RATE);
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
