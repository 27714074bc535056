use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::APP_DIR_NAME;
use super::model_catalog::ModelOption;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Locates model files on disk and downloads missing ones.
///
/// Lookup order: cache directory, then bundled directory, then download
/// into the cache.
#[derive(Clone, Debug)]
pub struct ModelResolver {
    cache_dir: PathBuf,
    bundled_dir: Option<PathBuf>,
}

impl ModelResolver {
    /// Resolver rooted at the platform cache directory.
    pub fn new() -> Result<Self, ModelResolveError> {
        Ok(Self::with_cache_dir(model_cache_dir()?))
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            bundled_dir: None,
        }
    }

    pub fn bundled_dir(mut self, dir: PathBuf) -> Self {
        self.bundled_dir = Some(dir);
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of an already available copy, without downloading.
    pub fn find_local(&self, file_name: &str) -> Option<PathBuf> {
        let cached = self.cache_dir.join(file_name);
        if cached.exists() {
            return Some(cached);
        }
        self.bundled_dir
            .as_ref()
            .map(|dir| dir.join(file_name))
            .filter(|p| p.exists())
    }

    pub fn resolve_option(
        &self,
        option: &ModelOption,
        progress: Option<ProgressFn>,
    ) -> Result<PathBuf, ModelResolveError> {
        self.resolve(&option.file_name(), &option.download_url(), progress)
    }

    pub fn resolve(
        &self,
        file_name: &str,
        url: &str,
        progress: Option<ProgressFn>,
    ) -> Result<PathBuf, ModelResolveError> {
        if let Some(found) = self.find_local(file_name) {
            log::debug!("Using local model {}", found.display());
            return Ok(found);
        }

        fs::create_dir_all(&self.cache_dir).map_err(ModelResolveError::CacheDir)?;
        let dest = self.cache_dir.join(file_name);
        log::info!("Downloading {url} to {}", dest.display());
        download(url, &dest, progress)?;
        Ok(dest)
    }
}

/// Resolve a model file by name using the platform cache directory.
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let mut resolver = ModelResolver::new()?;
    if let Some(dir) = bundled_dir {
        resolver = resolver.bundled_dir(dir.to_path_buf());
    }
    resolver.resolve(name, url, progress)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Speech Bridge/models/`
/// - Linux: `$XDG_CACHE_HOME/Speech Bridge/models/` or `~/.cache/Speech Bridge/models/`
/// - Windows: `%LOCALAPPDATA%/Speech Bridge/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(target_os = "macos"))]
    let base = dirs::cache_dir();

    base.map(|d| d.join(APP_DIR_NAME).join("models"))
        .ok_or(ModelResolveError::NoCacheDir)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let mut response = reqwest::blocking::get(url).map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;
    if !response.status().is_success() {
        return Err(ModelResolveError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let temp_path = dest.with_extension("part");

    // Stream to a temp file first, then rename so a failed download leaves nothing behind.
    if let Err(e) = write_stream(&mut response, &temp_path, total, progress.as_ref()) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, dest).map_err(|source| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source,
    })
}

fn write_stream(
    reader: &mut impl Read,
    path: &Path,
    total: u64,
    progress: Option<&ProgressFn>,
) -> Result<(), ModelResolveError> {
    let write_err = |source| ModelResolveError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).map_err(write_err)?;
    let mut buf = vec![0u8; 1024 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = reader.read(&mut buf).map_err(write_err)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        downloaded += n as u64;
        if let Some(cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model_catalog;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_finds_cached_file() {
        let tmp = TempDir::new().unwrap();
        let cached = tmp.path().join("ggml-tiny.bin");
        fs::write(&cached, b"fake model data").unwrap();

        let resolver = ModelResolver::with_cache_dir(tmp.path().to_path_buf());
        let path = resolver
            .resolve("ggml-tiny.bin", "http://invalid.example.com/model.bin", None)
            .unwrap();
        assert_eq!(path, cached);
    }

    #[test]
    fn test_resolve_finds_bundled_file() {
        let tmp = TempDir::new().unwrap();
        let bundled_dir = tmp.path().join("bundled");
        fs::create_dir_all(&bundled_dir).unwrap();
        let bundled = bundled_dir.join("ggml-tiny.bin");
        fs::write(&bundled, b"bundled model").unwrap();

        let resolver = ModelResolver::with_cache_dir(tmp.path().join("cache"))
            .bundled_dir(bundled_dir);
        let path = resolver
            .resolve_option(model_catalog::default_option(), None)
            .unwrap();
        assert_eq!(path, bundled);
    }

    #[test]
    fn test_cache_preferred_over_bundled() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let bundled_dir = tmp.path().join("bundled");
        fs::create_dir_all(&cache).unwrap();
        fs::create_dir_all(&bundled_dir).unwrap();
        fs::write(cache.join("m.bin"), b"a").unwrap();
        fs::write(bundled_dir.join("m.bin"), b"b").unwrap();

        let resolver = ModelResolver::with_cache_dir(cache.clone()).bundled_dir(bundled_dir);
        assert_eq!(resolver.find_local("m.bin"), Some(cache.join("m.bin")));
    }

    #[test]
    fn test_find_local_missing() {
        let tmp = TempDir::new().unwrap();
        let resolver = ModelResolver::with_cache_dir(tmp.path().to_path_buf());
        assert!(resolver.find_local("absent.bin").is_none());
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains(APP_DIR_NAME));
        assert!(path.to_string_lossy().contains("models"));
    }

    #[test]
    fn test_download_invalid_url_returns_error() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.bin");
        let result = download("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_atomic_no_partial_on_failure() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.bin");
        let _ = download("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
