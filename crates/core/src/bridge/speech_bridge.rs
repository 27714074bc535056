use std::path::Path;
use std::time::Instant;

use crate::audio::domain::audio_decoder::AudioDecoder;
use crate::audio::infrastructure::pcm_wav_decoder::PcmWavDecoder;
use crate::engine::domain::inference_backend::InferenceBackend;
use crate::engine::engine_context::{EngineContext, EngineState, LoadedModel};
use crate::shared::config::BridgeConfig;
use crate::shared::error::SpeechError;
use crate::transcription::run_profile::{RunParameters, RunProfile};
use crate::transcription::transcript::Transcript;
use crate::transcription::transcription_session::TranscriptionSession;

/// Entry point for hosts: load a model, transcribe files or sample buffers, release.
///
/// Every call that touches the engine is serialized on one lock, so a
/// `SpeechBridge` can be shared across threads behind an `Arc`. Calls block
/// while another caller's inference is running; issue buffer-mode calls
/// off any interactive thread.
pub struct SpeechBridge {
    engine: EngineContext,
    decoder: Box<dyn AudioDecoder>,
    max_buffer_threads: usize,
}

impl SpeechBridge {
    pub fn new(backend: Box<dyn InferenceBackend>, config: &BridgeConfig) -> Self {
        Self {
            engine: EngineContext::new(backend, config.load_options()),
            decoder: Box::new(PcmWavDecoder::new()),
            max_buffer_threads: config.max_buffer_threads,
        }
    }

    pub fn with_decoder(mut self, decoder: Box<dyn AudioDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Load a model. Returns `false` when no usable engine could be created.
    pub fn initialize(&self, model_path: &Path) -> bool {
        match self.try_initialize(model_path) {
            Ok(_) => true,
            Err(e) => {
                log::error!("Failed to initialize speech engine: {e}");
                false
            }
        }
    }

    pub fn try_initialize(&self, model_path: &Path) -> Result<LoadedModel, SpeechError> {
        log::debug!("Initializing with model: {}", model_path.display());
        self.engine.initialize(model_path)
    }

    /// Transcribe a canonical 16-bit PCM WAV file with the file profile.
    ///
    /// Initialization is checked before the file is read, so an uninitialized
    /// bridge reports [`SpeechError::NotInitialized`] even for a missing file.
    pub fn transcribe_file(&self, wav_path: &Path) -> Result<Transcript, SpeechError> {
        if self.engine.state() == EngineState::Unloaded {
            return Err(SpeechError::NotInitialized);
        }

        let start = Instant::now();
        log::debug!("Starting transcription of {}", wav_path.display());

        let audio = self.decoder.decode_file(wav_path)?;
        let params = RunParameters::for_profile(RunProfile::File, self.max_buffer_threads);
        let transcript = self.engine.with_context(|handle| {
            TranscriptionSession::new(handle, params).run(audio.samples())
        })?;

        log::debug!(
            "Transcription of {} took {}ms",
            wav_path.display(),
            start.elapsed().as_millis()
        );
        Ok(transcript)
    }

    /// Transcribe caller-supplied 16 kHz mono samples with the low-latency profile.
    ///
    /// An empty buffer is not an error: it yields an empty transcript without
    /// touching the engine.
    pub fn transcribe_buffer(&self, samples: &[f32]) -> Result<Transcript, SpeechError> {
        if samples.is_empty() {
            log::warn!("Empty sample buffer, nothing to transcribe");
            return Ok(Transcript::empty());
        }

        let params = RunParameters::for_profile(RunProfile::Buffer, self.max_buffer_threads);
        self.engine
            .with_context(|handle| TranscriptionSession::new(handle, params).run(samples))
    }

    pub fn release(&self) {
        self.engine.release();
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn loaded_model(&self) -> Option<LoadedModel> {
        self.engine.loaded_model()
    }
}

/// Flatten a result into the text-only form some hosts expect:
/// the transcript, or `"Error: <message>"`.
pub fn host_text(result: &Result<Transcript, SpeechError>) -> String {
    match result {
        Ok(t) => t.text.clone(),
        Err(e) => format!("Error: {e}"),
    }
}
