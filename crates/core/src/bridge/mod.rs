pub mod speech_bridge;
