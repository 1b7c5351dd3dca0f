// Purpose - external interfaces: the audio device host driving a synth

pub mod output;

pub use output::AudioOutput;
