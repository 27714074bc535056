use crate::shared::constants::WHISPER_SAMPLE_RATE;

/// Mono PCM samples normalized to [-1.0, 1.0], ready for inference.
///
/// `sample_rate` records what the source declared. Nothing resamples, so a
/// value other than 16 kHz only tells the caller the timing will be off.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Wrap caller-supplied samples assumed to already be 16 kHz mono.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self::new(samples, WHISPER_SAMPLE_RATE)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_reference_rate(&self) -> bool {
        self.sample_rate == WHISPER_SAMPLE_RATE
    }

    /// Split into consecutive chunks of at most `chunk_len` samples.
    pub fn chunks(&self, chunk_len: usize) -> impl Iterator<Item = &[f32]> {
        self.samples.chunks(chunk_len.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_samples_uses_reference_rate() {
        let buf = AudioBuffer::from_samples(vec![0.0; 10]);
        assert_eq!(buf.sample_rate(), 16000);
        assert!(buf.is_reference_rate());
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_duration_mono() {
        let buf = AudioBuffer::new(vec![0.0; 48000], 16000);
        assert_eq!(buf.duration(), 3.0);
    }

    #[test]
    fn test_duration_zero_rate_is_zero() {
        let buf = AudioBuffer::new(vec![0.0; 100], 0);
        assert_eq!(buf.duration(), 0.0);
    }

    #[test]
    fn test_non_reference_rate_is_flagged() {
        let buf = AudioBuffer::new(vec![0.0; 100], 44100);
        assert!(!buf.is_reference_rate());
    }

    #[test]
    fn test_chunks_keeps_remainder() {
        let buf = AudioBuffer::from_samples(vec![0.0; 10]);
        let lens: Vec<usize> = buf.chunks(4).map(|c| c.len()).collect();
        assert_eq!(lens, vec![4, 4, 2]);
    }

    #[test]
    fn test_empty_buffer() {
        let buf = AudioBuffer::from_samples(Vec::new());
        assert!(buf.is_empty());
        assert_eq!(buf.chunks(4).count(), 0);
    }
}
