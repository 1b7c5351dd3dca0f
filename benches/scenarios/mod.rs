//! Whole-synth benchmarks.
//!
//! These render interleaved stereo host buffers through [`Synth::fill_buffer`],
//! so they include control ticks, bridge notifications and shared generators.
//!
//! [`Synth::fill_buffer`]: tonal_graph::Synth::fill_buffer

mod control;
mod patches;

pub use control::bench_control_graph;
pub use patches::bench_patches;
