use crate::audio::domain::audio_buffer::AudioBuffer;
use crate::audio::domain::audio_decoder::AudioDecoder;
use crate::shared::constants::{
    PCM16_SCALE, WAV_BITS_PER_SAMPLE_OFFSET, WAV_CHANNELS_OFFSET, WAV_HEADER_SIZE,
    WAV_SAMPLE_RATE_OFFSET, WHISPER_SAMPLE_RATE,
};
use crate::shared::error::SpeechError;

/// Format fields read from a canonical 44-byte WAV header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavHeader {
    /// Read the format fields at their fixed offsets.
    ///
    /// Chunk IDs are not checked and extended layouts are not supported;
    /// the data chunk is assumed to start at byte 44.
    pub fn parse(bytes: &[u8]) -> Result<Self, SpeechError> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(SpeechError::MalformedInput(format!(
                "WAV data is {} bytes, shorter than the {WAV_HEADER_SIZE}-byte header",
                bytes.len()
            )));
        }
        Ok(Self {
            channels: read_u16_le(bytes, WAV_CHANNELS_OFFSET)?,
            sample_rate: read_u32_le(bytes, WAV_SAMPLE_RATE_OFFSET)?,
            bits_per_sample: read_u16_le(bytes, WAV_BITS_PER_SAMPLE_OFFSET)?,
        })
    }
}

/// Decodes canonical 16-bit PCM WAV into 16 kHz mono samples.
///
/// Stereo is downmixed by averaging left/right pairs. Other channel counts
/// pass through interleaved. No resampling: a non-16 kHz file is decoded
/// with a warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcmWavDecoder;

impl PcmWavDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for PcmWavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer, SpeechError> {
        let header = WavHeader::parse(bytes)?;

        if header.sample_rate != WHISPER_SAMPLE_RATE {
            log::warn!(
                "WAV sample rate is {} Hz, expected {WHISPER_SAMPLE_RATE} Hz; decoding without resampling",
                header.sample_rate
            );
        }

        if header.bits_per_sample != 16 {
            return Err(SpeechError::MalformedInput(format!(
                "only 16-bit PCM is supported, got {} bits per sample",
                header.bits_per_sample
            )));
        }

        let samples = normalize_pcm16(&bytes[WAV_HEADER_SIZE..]);
        let samples = if header.channels == 2 {
            downmix_stereo(&samples)
        } else {
            samples
        };

        log::debug!(
            "Decoded WAV: channels={}, rate={}, mono_samples={}",
            header.channels,
            header.sample_rate,
            samples.len()
        );

        Ok(AudioBuffer::new(samples, header.sample_rate))
    }
}

fn read_u16_le(bytes: &[u8], offset: usize) -> Result<u16, SpeechError> {
    bytes
        .get(offset..offset + 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or_else(|| SpeechError::MalformedInput(format!("header truncated at offset {offset}")))
}

fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32, SpeechError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| SpeechError::MalformedInput(format!("header truncated at offset {offset}")))
}

/// Convert little-endian signed 16-bit samples to floats. A trailing odd byte is ignored.
fn normalize_pcm16(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / PCM16_SCALE)
        .collect()
}

/// Average interleaved L/R pairs. An unpaired trailing sample is dropped.
fn downmix_stereo(samples: &[f32]) -> Vec<f32> {
    samples
        .chunks_exact(2)
        .map(|lr| (lr[0] + lr[1]) / 2.0)
        .collect()
}
