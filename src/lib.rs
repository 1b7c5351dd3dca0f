pub mod control; // Control-rate nodes, parameters and triggers
pub mod dsp;
pub mod graph; // Composable audio-rate generators
pub mod io;
pub mod patches; // Ready-made synthesizer graphs
pub mod synth; // Engine instance, render loop and notifications

pub use control::Control;
pub use graph::{Frame, Gen, IntoGen};
pub use synth::{EngineConfig, Synth, SynthError};

/// Number of audio frames rendered per control-rate tick.
pub const CONTROL_BLOCK_SIZE: usize = 64;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
