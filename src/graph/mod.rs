//! Composable audio-rate generators.
//!
//! Every node is wrapped in [`Gen`], which overloads `+ - * /` so graphs read
//! like expressions. Operands are other `Gen` values or `f32` constants;
//! control-rate values enter the audio graph through [`crate::Control::hold`]
//! or as the control parameters of a node (filter Q, envelope times, ...).

/// Stereo feedback delay.
pub mod delay;
/// Control-triggered ADSR.
pub mod envelope;
/// State-variable filters with audio-rate cutoff.
pub mod filter;
/// Control-to-audio sample-and-hold and control inputs.
pub mod hold;
/// Core frame, context and generator types.
pub mod node;
/// White and pink noise sources.
pub mod noise;
/// Arithmetic combinators.
pub mod ops;
/// Audio-band oscillators.
pub mod oscillator;
/// Equal-power panner.
pub mod pan;
/// Schroeder reverb.
pub mod reverb;
/// Evaluate-once sharing of a generator between consumers.
pub mod shared;

pub use delay::stereo_delay;
pub use envelope::adsr;
pub use filter::{bpf12, hpf12, hpf24, lpf12, lpf24};
pub use hold::{ControlInput, Hold};
pub use node::{Frame, Gen, Generator, GraphBuilder, IntoGen, RenderCtx};
pub use noise::{pink, white};
pub use ops::{combine, BinaryOp, Constant};
pub use oscillator::{saw, sine, square, triangle};
pub use pan::pan;
pub use reverb::reverb;
pub use shared::SharedGen;
