use std::time::Instant;

use super::run_profile::RunParameters;
use super::transcript::Transcript;
use crate::engine::domain::inference_backend::InferenceHandle;
use crate::shared::error::SpeechError;

/// Runs one inference pass on an already-locked context and collects the text.
///
/// The caller holds exclusive access to `handle` for the duration of `run`.
pub struct TranscriptionSession<'a> {
    handle: &'a mut dyn InferenceHandle,
    params: RunParameters,
}

impl<'a> TranscriptionSession<'a> {
    pub fn new(handle: &'a mut dyn InferenceHandle, params: RunParameters) -> Self {
        Self { handle, params }
    }

    pub fn run(self, samples: &[f32]) -> Result<Transcript, SpeechError> {
        if samples.is_empty() {
            return Err(SpeechError::EmptyInput);
        }

        log::debug!(
            "Running inference on {} samples (threads={:?}, single_segment={})",
            samples.len(),
            self.params.n_threads,
            self.params.single_segment
        );
        let start = Instant::now();

        self.handle.run(samples, &self.params).map_err(|e| {
            log::error!("Inference failed after {:?}: {e}", start.elapsed());
            SpeechError::InferenceFailed(e)
        })?;

        let count = self.handle.segment_count();
        let mut segments = Vec::with_capacity(count);
        for i in 0..count {
            let text = self
                .handle
                .segment_text(i)
                .map_err(SpeechError::InferenceFailed)?;
            segments.push(text);
        }

        let transcript = Transcript::from_segments(segments);
        log::debug!(
            "Inference produced {} segments, {} chars in {:?}",
            count,
            transcript.text.len(),
            start.elapsed()
        );
        Ok(transcript)
    }
}
