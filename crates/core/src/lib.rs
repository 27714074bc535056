pub mod audio;
pub mod bridge;
pub mod engine;
pub mod shared;
pub mod transcription;

pub use bridge::speech_bridge::{host_text, SpeechBridge};
pub use shared::config::BridgeConfig;
pub use shared::error::{ErrorKind, SpeechError};
pub use transcription::transcript::Transcript;
