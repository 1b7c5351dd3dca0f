//! Benchmarks for control-rate evaluation on its own.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonal_graph::{
    control::{metro, pulse, random, Control},
    EngineConfig, Synth,
};

/// A synth whose output is silent but which bridges `chains` independent
/// metro -> random -> pulse chains, so every block ticks all of them.
fn control_only(chains: usize) -> Synth {
    let mut synth = Synth::new(EngineConfig::default()).unwrap();
    for i in 0..chains {
        let beat: Control = metro().bpm(60.0 + i as f32).into();
        let length: Control = random().min(0.05).max(0.2).trigger(&beat).into();
        let gate: Control = pulse().length(length).trigger(&beat).into();
        synth.bridge(&(gate * 0.5 + 0.25));
    }
    synth
}

pub fn bench_control_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/control");
    let frames = 512;
    let mut buffer = vec![0.0f32; frames * 2];

    for chains in [1, 16, 64] {
        let mut synth = control_only(chains);
        group.bench_with_input(BenchmarkId::new("chains", chains), &chains, |b, _| {
            b.iter(|| {
                synth.fill_buffer(black_box(&mut buffer), frames, 2);
            })
        });
    }

    group.finish();
}
