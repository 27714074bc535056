use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::engine::domain::accelerator::Accelerator;
use crate::engine::domain::inference_backend::{InferenceBackend, InferenceHandle};
use crate::engine::load_strategy::{load_with_fallback, ExecutionPath, LoadOptions};
use crate::shared::error::SpeechError;

/// Observable lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Unloaded,
    Loaded,
}

/// Summary of a successful load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedModel {
    pub model_path: PathBuf,
    pub execution: ExecutionPath,
}

struct Slot {
    handle: Option<Box<dyn InferenceHandle>>,
    loaded: Option<LoadedModel>,
}

/// Owns the single inference context and the lock that serializes every use of it.
///
/// All operations take the same mutex for their whole duration: loading,
/// running and releasing never overlap. The slot only ever holds a fully
/// initialized handle or nothing.
pub struct EngineContext {
    backend: Box<dyn InferenceBackend>,
    options: LoadOptions,
    slot: Mutex<Slot>,
    system_info_logged: AtomicBool,
}

impl EngineContext {
    pub fn new(backend: Box<dyn InferenceBackend>, options: LoadOptions) -> Self {
        Self {
            backend,
            options,
            slot: Mutex::new(Slot {
                handle: None,
                loaded: None,
            }),
            system_info_logged: AtomicBool::new(false),
        }
    }

    /// Load `model_path`, replacing any context already loaded.
    ///
    /// The previous handle is freed before the new load starts, so a failed
    /// replacement leaves the context unloaded.
    pub fn initialize(&self, model_path: &Path) -> Result<LoadedModel, SpeechError> {
        let mut slot = self.lock();

        if let Some(old) = slot.handle.take() {
            let previous = slot.loaded.take();
            log::warn!(
                "Replacing loaded model {} with {}",
                previous
                    .map(|m| m.model_path.display().to_string())
                    .unwrap_or_default(),
                model_path.display()
            );
            drop(old);
        }

        std::fs::File::open(model_path).map_err(|source| {
            log::error!("Model file not readable at {}: {source}", model_path.display());
            SpeechError::ModelNotReadable {
                path: model_path.to_path_buf(),
                source,
            }
        })?;

        let (handle, execution) =
            load_with_fallback(self.backend.as_ref(), model_path, self.options)?;

        let loaded = LoadedModel {
            model_path: model_path.to_path_buf(),
            execution,
        };
        slot.handle = Some(handle);
        slot.loaded = Some(loaded.clone());

        log::info!(
            "Model loaded from {} on {}",
            model_path.display(),
            execution
        );
        self.log_system_info_once();

        Ok(loaded)
    }

    /// Run `f` with exclusive access to the loaded handle.
    ///
    /// Fails with [`SpeechError::NotInitialized`] when nothing is loaded. The
    /// lock is released when this returns or unwinds.
    pub fn with_context<R>(
        &self,
        f: impl FnOnce(&mut dyn InferenceHandle) -> Result<R, SpeechError>,
    ) -> Result<R, SpeechError> {
        let mut slot = self.lock();
        match slot.handle.as_mut() {
            Some(handle) => f(handle.as_mut()),
            None => Err(SpeechError::NotInitialized),
        }
    }

    /// Free the loaded handle, if any. Calling this when unloaded is a no-op.
    pub fn release(&self) {
        let mut slot = self.lock();
        if let Some(handle) = slot.handle.take() {
            drop(handle);
            if let Some(loaded) = slot.loaded.take() {
                log::info!("Released model {}", loaded.model_path.display());
            }
        } else {
            log::debug!("Release requested with no model loaded");
        }
    }

    pub fn state(&self) -> EngineState {
        if self.lock().handle.is_some() {
            EngineState::Loaded
        } else {
            EngineState::Unloaded
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == EngineState::Loaded
    }

    pub fn loaded_model(&self) -> Option<LoadedModel> {
        self.lock().loaded.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("Engine lock was poisoned by a panicking caller; recovering");
            poisoned.into_inner()
        })
    }

    fn log_system_info_once(&self) {
        if self.system_info_logged.swap(true, Ordering::SeqCst) {
            return;
        }
        let info = self.backend.system_info();
        let accelerator = Accelerator::from_system_info(&info);
        log::info!("Inference engine: {accelerator}");
        log::info!("System info: {info}");
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        self.release();
    }
}
