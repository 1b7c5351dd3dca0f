//! Ready-made synthesizer patches.
//!
//! Each patch builds its graph on a fresh [`crate::Synth`] and returns it
//! together with the handles a host needs to play it. Study them as examples
//! of wiring the control network into audio-rate generators.
//!
//! # Example
//!
//! ```ignore
//! use tonal_graph::{patches, EngineConfig};
//!
//! let keys = patches::instrument(EngineConfig::default(), false)?;
//! keys.play_degree(4)?;
//!
//! let study = patches::synesthesia(EngineConfig::default())?;
//! for voice in &study.voices {
//!     voice.pulse.subscribe(|n| println!("flash {}", n.value));
//! }
//! ```

mod instruments;
mod synesthesia;

pub use instruments::{instrument, play_degree, Instrument, PENTATONIC_DEGREES};
pub use synesthesia::{synesthesia, Synesthesia, VoiceEvents, NUM_VOICES};
