use std::path::Path;

use crate::engine::domain::inference_backend::{ContextParams, InferenceBackend, InferenceHandle};
use crate::shared::error::SpeechError;

/// Which execution profile produced the loaded context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionPath {
    Gpu,
    Cpu,
}

impl std::fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionPath::Gpu => write!(f, "GPU"),
            ExecutionPath::Cpu => write!(f, "CPU"),
        }
    }
}

/// Load options shared by both attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip the accelerated attempt entirely.
    pub prefer_gpu: bool,
    pub gpu_device: i32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            prefer_gpu: true,
            gpu_device: 0,
        }
    }
}

/// Creates a context, trying the GPU profile first and the CPU profile second.
///
/// At most two attempts are made. Flash attention stays off in both. When
/// `prefer_gpu` is false only the CPU attempt runs.
pub fn load_with_fallback(
    backend: &dyn InferenceBackend,
    model_path: &Path,
    options: LoadOptions,
) -> Result<(Box<dyn InferenceHandle>, ExecutionPath), SpeechError> {
    let gpu_error = if options.prefer_gpu {
        log::debug!(
            "Loading model from {} with GPU device {}",
            model_path.display(),
            options.gpu_device
        );
        match backend.init(model_path, &ContextParams::gpu(options.gpu_device)) {
            Ok(handle) => return Ok((handle, ExecutionPath::Gpu)),
            Err(e) => {
                log::warn!("GPU load failed ({e}), falling back to CPU");
                e.to_string()
            }
        }
    } else {
        "GPU disabled by configuration".to_string()
    };

    log::debug!("Loading model from {} on CPU", model_path.display());
    match backend.init(model_path, &ContextParams::cpu()) {
        Ok(handle) => Ok((handle, ExecutionPath::Cpu)),
        Err(e) => {
            log::error!("CPU load failed for {}: {e}", model_path.display());
            Err(SpeechError::LoadFailed {
                path: model_path.to_path_buf(),
                gpu: gpu_error,
                cpu: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake_backend::FakeBackend;
    use crate::shared::error::ErrorKind;

    #[test]
    fn test_gpu_success_uses_single_attempt() {
        let backend = FakeBackend::new();
        let (_handle, path) =
            load_with_fallback(&backend, Path::new("model.bin"), LoadOptions::default()).unwrap();
        assert_eq!(path, ExecutionPath::Gpu);
        assert_eq!(backend.stats().init_calls(), 1);
    }

    #[test]
    fn test_gpu_failure_falls_back_to_cpu() {
        let backend = FakeBackend::new().fail_gpu_init();
        let (_handle, path) =
            load_with_fallback(&backend, Path::new("model.bin"), LoadOptions::default()).unwrap();
        assert_eq!(path, ExecutionPath::Cpu);
        assert_eq!(backend.stats().init_calls(), 2);
    }

    #[test]
    fn test_both_attempts_failing_reports_load_failed() {
        let backend = FakeBackend::new().fail_gpu_init().fail_cpu_init();
        let err = load_with_fallback(&backend, Path::new("model.bin"), LoadOptions::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::LoadFailed);
        assert_eq!(backend.stats().init_calls(), 2);
        assert_eq!(backend.stats().live_handles(), 0);
    }

    #[test]
    fn test_flash_attention_disabled_in_both_attempts() {
        let backend = FakeBackend::new().fail_gpu_init();
        let _ = load_with_fallback(&backend, Path::new("model.bin"), LoadOptions::default());
        let params = backend.stats().init_params();
        assert_eq!(params.len(), 2);
        assert!(params[0].use_gpu);
        assert!(!params[1].use_gpu);
        assert!(params.iter().all(|p| !p.flash_attention));
    }

    #[test]
    fn test_gpu_disabled_goes_straight_to_cpu() {
        let backend = FakeBackend::new();
        let options = LoadOptions {
            prefer_gpu: false,
            gpu_device: 0,
        };
        let (_handle, path) =
            load_with_fallback(&backend, Path::new("model.bin"), options).unwrap();
        assert_eq!(path, ExecutionPath::Cpu);
        assert_eq!(backend.stats().init_calls(), 1);
    }
}
