/// Sample rate every inference call expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Size of the canonical PCM WAV header; sample data starts right after it.
pub const WAV_HEADER_SIZE: usize = 44;

pub const WAV_CHANNELS_OFFSET: usize = 22;
pub const WAV_SAMPLE_RATE_OFFSET: usize = 24;
pub const WAV_BITS_PER_SAMPLE_OFFSET: usize = 34;

/// Divisor mapping a signed 16-bit sample onto [-1.0, 1.0).
pub const PCM16_SCALE: f32 = 32768.0;

/// Upper bound on inference threads in buffer mode.
pub const BUFFER_MAX_THREADS: usize = 4;

/// Buffer-mode thread count when hardware concurrency is unknown.
pub const BUFFER_FALLBACK_THREADS: usize = 2;

/// Streaming chunks shorter than this (1 second at 16 kHz) are skipped.
pub const MIN_CHUNK_SAMPLES: usize = 16_000;

pub const DEFAULT_STREAM_CHUNK_SECONDS: u32 = 5;

pub const APP_DIR_NAME: &str = "Speech Bridge";
