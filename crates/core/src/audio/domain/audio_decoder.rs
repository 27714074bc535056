use std::path::Path;

use super::audio_buffer::AudioBuffer;
use crate::shared::error::SpeechError;

/// Domain interface for turning an audio container into inference-ready samples.
pub trait AudioDecoder: Send + Sync {
    /// Decode an in-memory container to mono normalized samples.
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, SpeechError>;

    /// Read and decode a container from disk.
    fn decode_file(&self, path: &Path) -> Result<AudioBuffer, SpeechError> {
        let bytes = std::fs::read(path).map_err(|source| SpeechError::AudioUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        self.decode(&bytes)
    }
}
