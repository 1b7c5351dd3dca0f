//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonal_graph::dsp::filter::{FilterKind, SVFilter, SvfCoefficients};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for (name, kind) in [
            ("lowpass", FilterKind::LowPass),
            ("highpass", FilterKind::HighPass),
            ("bandpass", FilterKind::BandPass),
        ] {
            let mut filter = SVFilter::new();
            let coeffs = SvfCoefficients::new(1_000.0, 2.0, SAMPLE_RATE);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (out, &x) in buffer.iter_mut().zip(&input) {
                        *out = filter.process(black_box(x), kind, &coeffs);
                    }
                    black_box(&buffer);
                })
            });
        }

        // Modulated cutoff: coefficients recomputed every sample, as the
        // graph filter does.
        let mut filter = SVFilter::new();
        group.bench_with_input(BenchmarkId::new("lowpass_modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, (out, &x)) in buffer.iter_mut().zip(&input).enumerate() {
                    let cutoff = 500.0 + i as f32 * 4.0;
                    let coeffs = SvfCoefficients::new(cutoff, 2.0, SAMPLE_RATE);
                    *out = filter.process(black_box(x), FilterKind::LowPass, &coeffs);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
