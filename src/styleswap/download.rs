//! Saving the current result to disk.

use crate::backdrop::GenerationResult;
use crate::image_generation::decode_base64;
use chrono::Utc;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// There is no current result to save.
    NoResult,
    /// The result payload is not valid base64.
    Decode(String),
    /// Writing the file failed.
    Io(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::NoResult => write!(f, "Nothing to download yet"),
            DownloadError::Decode(msg) => write!(f, "Result image is corrupt: {}", msg),
            DownloadError::Io(msg) => write!(f, "Could not save image: {}", msg),
        }
    }
}

impl Error for DownloadError {}

/// `<prefix>-<unix millis>.png`
pub fn download_file_name(prefix: &str, timestamp_millis: i64) -> String {
    format!("{}-{}.png", prefix, timestamp_millis)
}

/// Decode `result` and write it into `dir` under a timestamped name.
pub async fn save_result(
    result: &GenerationResult,
    dir: &Path,
    prefix: &str,
) -> Result<PathBuf, DownloadError> {
    let bytes =
        decode_base64(result.payload()).map_err(|e| DownloadError::Decode(e.to_string()))?;
    if result.detected_format() != "png" {
        log::warn!(
            "Saving {} payload with a .png extension",
            result.detected_format()
        );
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DownloadError::Io(e.to_string()))?;
    let path = dir.join(download_file_name(prefix, Utc::now().timestamp_millis()));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| DownloadError::Io(e.to_string()))?;

    log::info!("Saved result to {}", path.display());
    Ok(path)
}
