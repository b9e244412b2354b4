//! Download the vaccinations dataset into the local cache file.

use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::RunConfig;
use crate::error::AppError;

pub struct DatasetClient {
    client: Client,
}

impl DatasetClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::DataAccess(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Stream `url` into `dest`, replacing any previous copy.
    ///
    /// The body is written to a temporary file in the same directory and
    /// renamed over `dest` only once it is complete, so a failed transfer
    /// leaves the previous cache untouched.
    ///
    /// Returns the number of bytes written.
    pub fn download(&self, url: &str, dest: &Path) -> Result<u64, AppError> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::DataAccess(format!("Dataset request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::DataAccess(format!(
                "Dataset request failed with status {}.",
                resp.status()
            )));
        }

        let dir = match dest.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => dir,
            None => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| {
            AppError::DataAccess(format!("Failed to create cache directory '{}': {e}", dir.display()))
        })?;

        let staging = NamedTempFile::new_in(dir)
            .map_err(|e| AppError::DataAccess(format!("Failed to create temporary file in '{}': {e}", dir.display())))?;
        let mut writer = BufWriter::new(staging);
        let bytes = resp
            .copy_to(&mut writer)
            .map_err(|e| AppError::DataAccess(format!("Failed to download dataset: {e}")))?;
        let staging = writer.into_inner().map_err(|e| {
            AppError::DataAccess(format!("Failed to write cache file '{}': {}", dest.display(), e.error()))
        })?;
        staging.persist(dest).map_err(|e| {
            AppError::DataAccess(format!("Failed to replace cache file '{}': {}", dest.display(), e.error))
        })?;

        Ok(bytes)
    }
}

/// Fetch the configured dataset URL into `config.cache_path`.
pub fn fetch_dataset(config: &RunConfig) -> Result<PathBuf, AppError> {
    let client = DatasetClient::new(config.fetch_timeout)?;
    let bytes = client.download(&config.dataset_url, &config.cache_path)?;
    info!(
        url = %config.dataset_url,
        path = %config.cache_path.display(),
        bytes,
        "downloaded dataset"
    );
    Ok(config.cache_path.clone())
}
