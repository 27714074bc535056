use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    APP_DIR_NAME, BUFFER_MAX_THREADS, DEFAULT_STREAM_CHUNK_SECONDS, MIN_CHUNK_SAMPLES,
};
use super::model_catalog::DEFAULT_MODEL_ID;
use crate::engine::load_strategy::LoadOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Persistent bridge settings.
///
/// Missing fields fall back to their defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Catalog id used when no explicit `model_path` is set.
    pub model_id: String,
    pub model_path: Option<PathBuf>,
    pub use_gpu: bool,
    pub gpu_device: i32,
    pub max_buffer_threads: usize,
    pub stream_chunk_seconds: u32,
    pub min_chunk_samples: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_path: None,
            use_gpu: true,
            gpu_device: 0,
            max_buffer_threads: BUFFER_MAX_THREADS,
            stream_chunk_seconds: DEFAULT_STREAM_CHUNK_SECONDS,
            min_chunk_samples: MIN_CHUNK_SAMPLES,
        }
    }
}

impl BridgeConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
    }

    /// Load from the platform config path, or defaults if absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            log::warn!("{e}; using default config");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            prefer_gpu: self.use_gpu,
            gpu_device: self.gpu_device,
        }
    }

    /// Samples per streaming chunk at 16 kHz.
    pub fn stream_chunk_samples(&self) -> usize {
        self.stream_chunk_seconds.max(1) as usize
            * crate::shared::constants::WHISPER_SAMPLE_RATE as usize
    }
}
