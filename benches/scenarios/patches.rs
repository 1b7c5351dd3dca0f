//! Benchmarks for the bundled patches at the common host buffer sizes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonal_graph::{patches, EngineConfig};

use crate::BLOCK_SIZES;

pub fn bench_patches(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/patches");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size * 2];

        // === SYNESTHESIA ===
        // five noise voices, one shared noise source, reverb on the sum
        let mut study = patches::synesthesia(EngineConfig::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("synesthesia", size), &size, |b, &size| {
            b.iter(|| {
                study.synth.fill_buffer(black_box(&mut buffer), size, 2);
            })
        });

        // === INSTRUMENT ===
        // saw lead through a swept 24 dB low-pass and a stereo delay
        let mut keys = patches::instrument(EngineConfig::default(), true).unwrap();
        keys.play_degree(4).unwrap();
        group.bench_with_input(BenchmarkId::new("instrument", size), &size, |b, &size| {
            b.iter(|| {
                // Retrigger now and then so the envelope never settles.
                keys.play_degree(4).unwrap();
                keys.synth.fill_buffer(black_box(&mut buffer), size, 2);
            })
        });
    }

    group.finish();
}
