use std::error::Error as StdError;

use thiserror::Error;

/// Diarist's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Diarist's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Variants mirror the failure taxonomy of the alignment pipeline:
/// - malformed diarization records are recovered locally (skip + warn) and only surface
///   here when an entire input is unusable
/// - a missing external model fails the single item that needed it
/// - everything else is carried through the generic variants
#[derive(Debug, Error)]
pub enum Error {
    /// A diarization record that cannot be interpreted (and no recovery applied).
    #[error("malformed diarization record: {0}")]
    MalformedRttm(String),

    /// An audio payload that could not be decoded into samples.
    #[error("failed to decode audio payload: {0}")]
    AudioDecode(String),

    /// A required external model (diarizer, ASR, punctuator) is not configured or failed to load.
    #[error("external model unavailable: {0}")]
    ModelUnavailable(String),

    /// Mapping was requested against a turn index with no speaker turns at all.
    ///
    /// There is no "last known speaker" to degrade to in this case, so the item fails.
    #[error("speaker-turn index is empty")]
    EmptyTurnIndex,

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Self::AudioDecode(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::AudioDecode(err.to_string())
    }
}
