//! Error types
//!
//! Only the outer adapters (config loading, frame replay) can fail. Collaborator
//! failures inside the audio path have their own enums and are swallowed there.

use thiserror::Error;

/// Crate-level error
#[derive(Debug, Error)]
pub enum VeritasError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("landmark set needs at least {required} points, got {actual}")]
    InvalidLandmarks { required: usize, actual: usize },

    #[error("malformed frame on line {line}: {message}")]
    MalformedFrame { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, VeritasError>;

/// Microphone side did not produce a clip
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenError {
    #[error("no speech started within {0}s")]
    Timeout(u64),
    #[error("no speech detected")]
    NoSpeech,
    #[error("audio device unavailable: {0}")]
    Device(String),
}

/// Speech-to-text did not produce text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscribeError {
    #[error("speech was unintelligible")]
    Unintelligible,
    #[error("transcription service failed: {0}")]
    Service(String),
}

/// Remote scoring did not produce a score
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("no classifier credential configured")]
    NotConfigured,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("classifier returned status {0}")]
    Status(u16),
    #[error("unparseable classifier response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(value: reqwest::Error) -> Self {
        if let Some(status) = value.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(value.to_string())
        }
    }
}
