pub mod chunk_transcriber;
pub mod run_profile;
pub mod transcript;
pub mod transcription_session;
