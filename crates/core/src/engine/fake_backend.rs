//! Scriptable in-memory engine used by unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::domain::inference_backend::{
    BackendError, ContextParams, InferenceBackend, InferenceHandle,
};
use crate::transcription::run_profile::RunParameters;

/// Counters shared between a [`FakeBackend`] and every handle it creates.
#[derive(Default)]
pub struct FakeStats {
    init_calls: AtomicUsize,
    failed_inits: AtomicUsize,
    free_calls: AtomicUsize,
    run_calls: AtomicUsize,
    active_runs: AtomicUsize,
    max_concurrent_runs: AtomicUsize,
    init_params: Mutex<Vec<ContextParams>>,
    init_paths: Mutex<Vec<String>>,
    run_params: Mutex<Vec<RunParameters>>,
    run_sample_counts: Mutex<Vec<usize>>,
}

impl FakeStats {
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn free_calls(&self) -> usize {
        self.free_calls.load(Ordering::SeqCst)
    }

    /// Handles created and not yet dropped.
    pub fn live_handles(&self) -> usize {
        self.init_calls() - self.failed_inits.load(Ordering::SeqCst) - self.free_calls()
    }

    pub fn run_calls(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_runs(&self) -> usize {
        self.max_concurrent_runs.load(Ordering::SeqCst)
    }

    pub fn init_params(&self) -> Vec<ContextParams> {
        self.init_params.lock().unwrap().clone()
    }

    pub fn init_paths(&self) -> Vec<String> {
        self.init_paths.lock().unwrap().clone()
    }

    pub fn run_params(&self) -> Vec<RunParameters> {
        self.run_params.lock().unwrap().clone()
    }

    pub fn run_sample_counts(&self) -> Vec<usize> {
        self.run_sample_counts.lock().unwrap().clone()
    }
}

pub struct FakeBackend {
    stats: Arc<FakeStats>,
    segments: Vec<String>,
    fail_gpu_init: bool,
    fail_cpu_init: bool,
    run_status: Option<i32>,
    run_delay: Duration,
    system_info: String,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(FakeStats::default()),
            segments: Vec::new(),
            fail_gpu_init: false,
            fail_cpu_init: false,
            run_status: None,
            run_delay: Duration::ZERO,
            system_info: "AVX = 1 | NEON = 0".to_string(),
        }
    }

    pub fn with_segments(mut self, segments: &[&str]) -> Self {
        self.segments = segments.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn fail_gpu_init(mut self) -> Self {
        self.fail_gpu_init = true;
        self
    }

    pub fn fail_cpu_init(mut self) -> Self {
        self.fail_cpu_init = true;
        self
    }

    pub fn fail_run(mut self, status: i32) -> Self {
        self.run_status = Some(status);
        self
    }

    pub fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    pub fn stats(&self) -> Arc<FakeStats> {
        self.stats.clone()
    }
}

impl InferenceBackend for FakeBackend {
    fn init(
        &self,
        model_path: &Path,
        params: &ContextParams,
    ) -> Result<Box<dyn InferenceHandle>, BackendError> {
        self.stats.init_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.init_params.lock().unwrap().push(*params);
        self.stats
            .init_paths
            .lock()
            .unwrap()
            .push(model_path.display().to_string());

        let fail = if params.use_gpu {
            self.fail_gpu_init
        } else {
            self.fail_cpu_init
        };
        if fail {
            self.stats.failed_inits.fetch_add(1, Ordering::SeqCst);
            return Err(BackendError::Init("scripted failure".to_string()));
        }

        Ok(Box::new(FakeHandle {
            stats: self.stats.clone(),
            segments: self.segments.clone(),
            emitted: 0,
            run_status: self.run_status,
            run_delay: self.run_delay,
        }))
    }

    fn system_info(&self) -> String {
        self.system_info.clone()
    }
}

struct FakeHandle {
    stats: Arc<FakeStats>,
    segments: Vec<String>,
    emitted: usize,
    run_status: Option<i32>,
    run_delay: Duration,
}

impl InferenceHandle for FakeHandle {
    fn run(&mut self, samples: &[f32], params: &RunParameters) -> Result<(), BackendError> {
        let active = self.stats.active_runs.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats
            .max_concurrent_runs
            .fetch_max(active, Ordering::SeqCst);
        self.stats.run_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.run_params.lock().unwrap().push(params.clone());
        self.stats
            .run_sample_counts
            .lock()
            .unwrap()
            .push(samples.len());

        if !self.run_delay.is_zero() {
            std::thread::sleep(self.run_delay);
        }
        self.stats.active_runs.fetch_sub(1, Ordering::SeqCst);

        if let Some(status) = self.run_status {
            self.emitted = 0;
            return Err(BackendError::RunStatus(status));
        }
        self.emitted = self.segments.len();
        Ok(())
    }

    fn segment_count(&self) -> usize {
        self.emitted
    }

    fn segment_text(&self, index: usize) -> Result<String, BackendError> {
        self.segments
            .get(index)
            .cloned()
            .ok_or_else(|| BackendError::Segment(index, "out of range".to_string()))
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.stats.free_calls.fetch_add(1, Ordering::SeqCst);
    }
}
