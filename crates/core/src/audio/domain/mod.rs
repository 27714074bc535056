pub mod audio_buffer;
pub mod audio_decoder;
