use std::path::PathBuf;

use thiserror::Error;

use crate::engine::domain::inference_backend::BackendError;

/// Failure kinds surfaced by the bridge.
///
/// Hosts that only need to branch should match on [`SpeechError::kind`]
/// instead of the message text.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("model not initialized")]
    NotInitialized,
    #[error("failed to load model {path}: gpu attempt: {gpu}; cpu attempt: {cpu}")]
    LoadFailed {
        path: PathBuf,
        gpu: String,
        cpu: String,
    },
    #[error("model file not readable at {path}: {source}")]
    ModelNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed audio input: {0}")]
    MalformedInput(String),
    #[error("failed to read audio file {path}: {source}")]
    AudioUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported sample rate {0} Hz (expected 16000 Hz)")]
    UnsupportedRate(u32),
    #[error("no audio samples to transcribe")]
    EmptyInput,
    #[error("transcription failed: {0}")]
    InferenceFailed(#[source] BackendError),
}

/// Flat discriminant of [`SpeechError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    LoadFailed,
    MalformedInput,
    UnsupportedRate,
    EmptyInput,
    InferenceFailed,
}

impl SpeechError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpeechError::NotInitialized => ErrorKind::NotInitialized,
            SpeechError::LoadFailed { .. } | SpeechError::ModelNotReadable { .. } => {
                ErrorKind::LoadFailed
            }
            SpeechError::MalformedInput(_) | SpeechError::AudioUnreadable { .. } => {
                ErrorKind::MalformedInput
            }
            SpeechError::UnsupportedRate(_) => ErrorKind::UnsupportedRate,
            SpeechError::EmptyInput => ErrorKind::EmptyInput,
            SpeechError::InferenceFailed(_) => ErrorKind::InferenceFailed,
        }
    }
}
