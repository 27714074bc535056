use std::path::Path;

use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState,
};

use crate::engine::domain::inference_backend::{
    BackendError, ContextParams, InferenceBackend, InferenceHandle,
};
use crate::transcription::run_profile::RunParameters;

/// Inference backend using whisper.cpp via whisper-rs.
///
/// Expects a single GGML model file (e.g. `ggml-tiny.bin`).
#[derive(Debug, Default)]
pub struct WhisperBackend;

impl WhisperBackend {
    pub fn new() -> Self {
        Self
    }
}

impl InferenceBackend for WhisperBackend {
    fn init(
        &self,
        model_path: &Path,
        params: &ContextParams,
    ) -> Result<Box<dyn InferenceHandle>, BackendError> {
        let path = model_path
            .to_str()
            .ok_or_else(|| BackendError::Init("model path is not valid UTF-8".to_string()))?;

        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu = params.use_gpu;
        context_params.gpu_device = params.gpu_device;
        context_params.flash_attn = params.flash_attention;

        let context = WhisperContext::new_with_params(path, context_params)
            .map_err(|e| BackendError::Init(format!("failed to load Whisper model: {e}")))?;
        let state = context
            .create_state()
            .map_err(|e| BackendError::Init(format!("failed to create Whisper state: {e}")))?;

        Ok(Box::new(WhisperHandle {
            state,
            _context: context,
        }))
    }

    fn system_info(&self) -> String {
        whisper_rs::print_system_info().to_string()
    }
}

/// A whisper.cpp context and its decoding state. Dropping it frees both.
struct WhisperHandle {
    state: WhisperState,
    _context: WhisperContext,
}

impl InferenceHandle for WhisperHandle {
    fn run(&mut self, samples: &[f32], params: &RunParameters) -> Result<(), BackendError> {
        let mut full = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        if let Some(n) = params.n_threads {
            full.set_n_threads(n as i32);
        }
        full.set_no_context(params.no_context);
        full.set_single_segment(params.single_segment);
        full.set_no_timestamps(params.no_timestamps);
        full.set_print_progress(params.print_progress);
        full.set_print_realtime(params.print_realtime);
        full.set_print_special(false);
        full.set_print_timestamps(false);

        let status = self
            .state
            .full(full, samples)
            .map_err(|e| BackendError::Engine(e.to_string()))?;
        if status != 0 {
            return Err(BackendError::RunStatus(status));
        }
        Ok(())
    }

    fn segment_count(&self) -> usize {
        self.state.full_n_segments().max(0) as usize
    }

    fn segment_text(&self, index: usize) -> Result<String, BackendError> {
        let segment = self
            .state
            .get_segment(index as i32)
            .ok_or_else(|| BackendError::Segment(index, "segment missing".to_string()))?;
        segment
            .to_str_lossy()
            .map(|text| text.into_owned())
            .map_err(|e| BackendError::Segment(index, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_nonexistent_model_returns_error() {
        let backend = WhisperBackend::new();
        let result = backend.init(Path::new("/nonexistent/model.bin"), &ContextParams::cpu());
        assert!(matches!(result, Err(BackendError::Init(_))));
    }

    #[test]
    fn test_system_info_not_empty() {
        assert!(!WhisperBackend::new().system_info().is_empty());
    }

    #[test]
    #[ignore] // Requires whisper model file
    fn test_run_does_not_crash_on_sine_wave() {
        let model_path = crate::shared::model_resolver::resolve(
            crate::shared::model_catalog::default_option().file_name().as_str(),
            crate::shared::model_catalog::default_option().download_url().as_str(),
            None,
            None,
        )
        .expect("Failed to resolve whisper model");

        let mut handle = WhisperBackend::new()
            .init(&model_path, &ContextParams::cpu())
            .ok()
            .expect("Failed to load model");

        let sample_rate = 16000u32;
        let samples: Vec<f32> = (0..3 * sample_rate as usize)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * 440.0 * t).sin() as f32
            })
            .collect();

        let result = handle.run(&samples, &RunParameters::buffer_profile(4));
        assert!(result.is_ok(), "Inference should not error: {result:?}");
    }
}
