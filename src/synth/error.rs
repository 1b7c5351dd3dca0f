use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("parameter `{0}` is already registered")]
    DuplicateName(String),

    #[error("no parameter named `{0}`")]
    UnknownParameter(String),

    #[error("audio output unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// A shared generator or bridge handle from another synth instance.
    #[error("handle belongs to a different synth instance")]
    ForeignHandle,

    #[error("audio stream error: {0}")]
    Stream(String),
}
