use crate::shared::constants::{BUFFER_FALLBACK_THREADS, BUFFER_MAX_THREADS};

/// The two ways the bridge drives the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunProfile {
    /// Whole-file batch transcription with engine defaults.
    File,
    /// Short, independent chunks where latency matters more than context.
    Buffer,
}

/// Per-call engine settings derived from a [`RunProfile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunParameters {
    /// `None` leaves the engine's own default in place.
    pub n_threads: Option<usize>,
    pub no_context: bool,
    pub single_segment: bool,
    pub no_timestamps: bool,
    pub print_progress: bool,
    pub print_realtime: bool,
}

impl RunParameters {
    /// Engine defaults: multi-segment output with timestamps.
    pub fn file_profile() -> Self {
        Self {
            n_threads: None,
            no_context: false,
            single_segment: false,
            no_timestamps: false,
            print_progress: false,
            print_realtime: false,
        }
    }

    /// Low-latency settings: each call stands alone as one untimed segment.
    pub fn buffer_profile(max_threads: usize) -> Self {
        let hardware = std::thread::available_parallelism()
            .ok()
            .map(|n| n.get());
        Self {
            n_threads: Some(buffer_thread_count(hardware, max_threads)),
            no_context: true,
            single_segment: true,
            no_timestamps: true,
            print_progress: false,
            print_realtime: false,
        }
    }

    pub fn for_profile(profile: RunProfile, max_buffer_threads: usize) -> Self {
        match profile {
            RunProfile::File => Self::file_profile(),
            RunProfile::Buffer => Self::buffer_profile(max_buffer_threads),
        }
    }
}

/// Clamp detected hardware concurrency to `[1, max_threads]`.
///
/// Unknown concurrency yields 2 (still clamped). `max_threads` is itself
/// bounded to `[1, 4]`.
pub fn buffer_thread_count(hardware: Option<usize>, max_threads: usize) -> usize {
    let cap = max_threads.clamp(1, BUFFER_MAX_THREADS);
    hardware.unwrap_or(BUFFER_FALLBACK_THREADS).clamp(1, cap)
}
