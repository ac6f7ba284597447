//! Configuration for the watermarking pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::processing::PollPolicy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Remote service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Scheduling and polling configuration
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Output naming configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote watermarking service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Document API base URL (no trailing slash)
    pub base_url: String,
    /// Timeout for the multipart upload in seconds (default: 60)
    pub upload_timeout_secs: u64,
    /// Timeout for a single status poll in seconds (default: 10)
    pub poll_request_timeout_secs: u64,
    /// Timeout for the document download in seconds (default: 60)
    pub download_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.filigrane.beta.gouv.fr/api/document".to_string(),
            upload_timeout_secs: 60,
            poll_request_timeout_secs: 10,
            download_timeout_secs: 60,
        }
    }
}

/// Processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of concurrent workers in per-file mode (default: 8)
    pub workers: usize,
    /// Delay between two status polls in seconds (default: 3)
    pub poll_interval_secs: u64,
    /// Total polling time per job in seconds (default: 60 = 20 attempts)
    pub poll_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            poll_interval_secs: 3,
            poll_timeout_secs: 60,
        }
    }
}

impl ProcessingConfig {
    /// Polling schedule derived from interval and total timeout
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from_timeout(
            Duration::from_secs(self.poll_interval_secs),
            Duration::from_secs(self.poll_timeout_secs),
        )
    }
}

/// Output naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Watermark used when none is given on the command line
    pub default_watermark: String,
    /// Sub-directory of the input folder used when no output directory is given
    pub output_subdir: String,
    /// File name of the combined document in aggregate mode
    pub aggregate_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_watermark: "Document exclusivement destiné à la location immobilière"
                .to_string(),
            output_subdir: "filigrane".to_string(),
            aggregate_filename: "aggregated_filigrane_docs.pdf".to_string(),
        }
    }
}

impl BulkConfig {
    /// Parse a TOML document. Missing sections and keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load config from an explicit path, else the user config file if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config_dir>/bulk-filigrane/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bulk-filigrane").join("config.toml"))
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            return Err(Error::config("service.base_url must not be empty"));
        }
        if self.processing.workers == 0 {
            return Err(Error::config("processing.workers must be at least 1"));
        }
        if self.processing.poll_interval_secs == 0 {
            return Err(Error::config("processing.poll_interval_secs must be at least 1"));
        }
        if self.processing.poll_timeout_secs < self.processing.poll_interval_secs {
            return Err(Error::config(format!(
                "processing.poll_timeout_secs ({}) is shorter than poll_interval_secs ({})",
                self.processing.poll_timeout_secs, self.processing.poll_interval_secs
            )));
        }
        Ok(())
    }
}
