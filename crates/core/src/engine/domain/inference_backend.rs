use std::path::Path;

use thiserror::Error;

use crate::transcription::run_profile::RunParameters;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("engine rejected model: {0}")]
    Init(String),
    #[error("engine run returned status {0}")]
    RunStatus(i32),
    #[error("engine error: {0}")]
    Engine(String),
    #[error("segment {0} text unavailable: {1}")]
    Segment(usize, String),
}

/// Options passed to the engine when creating a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextParams {
    pub use_gpu: bool,
    pub gpu_device: i32,
    pub flash_attention: bool,
}

impl ContextParams {
    pub fn gpu(gpu_device: i32) -> Self {
        Self {
            use_gpu: true,
            gpu_device,
            flash_attention: false,
        }
    }

    pub fn cpu() -> Self {
        Self {
            use_gpu: false,
            gpu_device: 0,
            flash_attention: false,
        }
    }
}

/// Domain interface for the speech inference engine.
///
/// Creates contexts from a model file. The engine itself is opaque to the
/// bridge; implementations wrap a native library or, in tests, a fake.
pub trait InferenceBackend: Send + Sync {
    fn init(
        &self,
        model_path: &Path,
        params: &ContextParams,
    ) -> Result<Box<dyn InferenceHandle>, BackendError>;

    /// Build and capability summary of the native engine.
    fn system_info(&self) -> String;
}

/// A loaded, ready-to-run inference context.
///
/// `run` is synchronous and must not be re-entered; callers serialize access.
/// Dropping the handle frees the native context.
pub trait InferenceHandle: Send {
    fn run(&mut self, samples: &[f32], params: &RunParameters) -> Result<(), BackendError>;

    /// Number of segments emitted by the last `run`.
    fn segment_count(&self) -> usize;

    fn segment_text(&self, index: usize) -> Result<String, BackendError>;
}
