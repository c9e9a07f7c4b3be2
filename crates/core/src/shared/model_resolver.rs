use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::constants::APP_DIR_NAME;

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
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("model file not found: {0}")]
    NotFound(PathBuf),
    #[error("cannot derive a model file name from {0}")]
    BadUrl(String),
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Turn a configured model location into a local file path.
///
/// `http://` and `https://` locations go through [`resolve`] using the last
/// URL path segment as the cached file name. Anything else is a local path
/// that must already exist.
pub fn resolve_location(
    location: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if is_remote(location) {
        let name = file_name_from_url(location)
            .ok_or_else(|| ModelResolveError::BadUrl(location.to_string()))?;
        log::info!("Resolving model: {name}");
        return resolve(name, location, bundled_dir, progress);
    }

    let path = PathBuf::from(location);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ModelResolveError::NotFound(path))
    }
}

/// Resolve a model file by name, checking cache locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled path (for development / pre-packaged installs)
/// 3. Download from URL to cache
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?;
    let cached_path = cache_dir.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/SignSpeak/models/`
/// - Linux: `$XDG_CACHE_HOME/SignSpeak/models/` or `~/.cache/SignSpeak/models/`
/// - Windows: `%LOCALAPPDATA%/SignSpeak/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME).join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join(APP_DIR_NAME).join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn file_name_from_url(url: &str) -> Option<&str> {
    let without_query = url.split(['?', '#']).next()?;
    let (_, rest) = without_query.split_once("://")?;
    let (_, path) = rest.split_once('/')?;
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Written to a sibling .part file, then renamed into place
    let temp_path = dest.with_extension("part");
    let write_err = |source| ModelResolveError::Write {
        path: temp_path.clone(),
        source,
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err)?;

    let chunk_size = 1024 * 1024;
    let mut downloaded: u64 = 0;
    for chunk in bytes.chunks(chunk_size) {
        file.write_all(chunk).map_err(write_err)?;
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_location_existing_local_file() {
        let tmp = TempDir::new().unwrap();
        let model_path = tmp.path().join("hand_landmark.onnx");
        fs::write(&model_path, b"fake model").unwrap();

        let resolved = resolve_location(model_path.to_str().unwrap(), None, None).unwrap();
        assert_eq!(resolved, model_path);
    }

    #[test]
    fn test_resolve_location_missing_local_file() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.onnx");

        let err = resolve_location(missing.to_str().unwrap(), None, None).unwrap_err();
        assert!(matches!(err, ModelResolveError::NotFound(p) if p == missing));
    }

    #[test]
    fn test_resolve_location_directory_is_not_a_model() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_location(tmp.path().to_str().unwrap(), None, None).unwrap_err();
        assert!(matches!(err, ModelResolveError::NotFound(_)));
    }

    #[test]
    fn test_resolve_location_url_without_file_name() {
        let err = resolve_location("https://example.com/", None, None).unwrap_err();
        assert!(matches!(err, ModelResolveError::BadUrl(_)));
    }

    #[rstest]
    #[case::plain("https://host/models/hand.onnx", Some("hand.onnx"))]
    #[case::query("https://host/models/hand.onnx?download=1", Some("hand.onnx"))]
    #[case::fragment("http://host/a/b/c.onnx#x", Some("c.onnx"))]
    #[case::trailing_slash("https://host/models/", None)]
    #[case::host_only("https://host", None)]
    fn test_file_name_from_url(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(file_name_from_url(url), expected);
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains(APP_DIR_NAME));
        assert!(path.ends_with("models"));
    }

    #[test]
    fn test_download_invalid_url_returns_error() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");
        let result = download("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_atomic_no_partial_on_failure() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("model.onnx");
        let _ = download("http://invalid.nonexistent.example.com/model", &dest, None);
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
