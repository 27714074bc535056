use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::bridge::speech_bridge::SpeechBridge;
use crate::shared::constants::MIN_CHUNK_SAMPLES;
use crate::shared::error::SpeechError;
use crate::transcription::transcript::Transcript;

const DEFAULT_QUEUE_CAPACITY: usize = 4;

/// Outcome of one submitted chunk, in submission order.
#[derive(Debug)]
pub struct ChunkResult {
    pub index: usize,
    pub outcome: Result<Transcript, SpeechError>,
    pub elapsed: Duration,
}

/// Transcribes sample chunks on a dedicated worker thread.
///
/// Layout: `caller → [bounded queue] → worker → [results]`
///
/// The worker takes the engine lock once per chunk, so `initialize` and
/// `release` from other threads land between chunks.
pub struct ChunkTranscriber {
    chunk_tx: Option<Sender<Vec<f32>>>,
    result_rx: Receiver<ChunkResult>,
    worker: Option<JoinHandle<()>>,
}

impl ChunkTranscriber {
    pub fn spawn(bridge: Arc<SpeechBridge>) -> Self {
        Self::with_settings(bridge, MIN_CHUNK_SAMPLES, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_settings(bridge: Arc<SpeechBridge>, min_samples: usize, capacity: usize) -> Self {
        let (chunk_tx, chunk_rx) = crossbeam_channel::bounded::<Vec<f32>>(capacity.max(1));
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<ChunkResult>();
        let worker = spawn_worker(bridge, chunk_rx, result_tx, min_samples);

        Self {
            chunk_tx: Some(chunk_tx),
            result_rx,
            worker: Some(worker),
        }
    }

    /// Queue a chunk, blocking while the queue is full.
    /// Returns `false` once the worker has stopped.
    pub fn submit(&self, samples: Vec<f32>) -> bool {
        match &self.chunk_tx {
            Some(tx) => tx.send(samples).is_ok(),
            None => false,
        }
    }

    pub fn results(&self) -> &Receiver<ChunkResult> {
        &self.result_rx
    }

    /// Close the queue, wait for queued chunks to finish, and return the
    /// results not yet taken from [`Self::results`].
    pub fn finish(mut self) -> Vec<ChunkResult> {
        self.shutdown();
        self.result_rx.try_iter().collect()
    }

    fn shutdown(&mut self) {
        self.chunk_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Chunk transcription worker panicked");
            }
        }
    }
}

impl Drop for ChunkTranscriber {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(
    bridge: Arc<SpeechBridge>,
    chunk_rx: Receiver<Vec<f32>>,
    result_tx: Sender<ChunkResult>,
    min_samples: usize,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (index, chunk) in chunk_rx.into_iter().enumerate() {
            let start = Instant::now();
            let outcome = if chunk.len() < min_samples {
                log::debug!(
                    "Skipping chunk {index}: {} samples is below minimum {min_samples}",
                    chunk.len()
                );
                Ok(Transcript::empty())
            } else {
                bridge.transcribe_buffer(&chunk)
            };
            let elapsed = start.elapsed();

            match &outcome {
                Ok(t) => log::debug!(
                    "Chunk {index}: {} segments in {}ms",
                    t.segment_count(),
                    elapsed.as_millis()
                ),
                Err(e) => log::warn!("Chunk {index} failed: {e}"),
            }

            let result = ChunkResult {
                index,
                outcome,
                elapsed,
            };
            if result_tx.send(result).is_err() {
                break;
            }
        }
    })
}
