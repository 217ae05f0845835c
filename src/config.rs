use crate::constants::{
    DEFAULT_DESCRIPTIONS_DIR, DEFAULT_DESCRIPTIONS_ENDPOINT, DEFAULT_IMAGES_DIR,
    DEFAULT_IMAGES_ENDPOINT, DEFAULT_IMAGE_EXTENSION, DEFAULT_QUALITY, DEFAULT_TARGET_HEIGHT,
    DEFAULT_TARGET_WIDTH, DEFAULT_TEXT_EXTENSION, DEFAULT_TIMEOUT_SECS, MAX_QUALITY,
    MAX_TARGET_DIMENSION, MIN_QUALITY,
};
use crate::error::{IngestError, Result};
use crate::formats::{OutputFormat, ResampleFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Endpoints and transport settings for the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Receives one multipart `POST` per converted image.
    pub images_endpoint: String,
    /// Receives the JSON array of product records.
    pub descriptions_endpoint: String,
    pub timeout_secs: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            images_endpoint: DEFAULT_IMAGES_ENDPOINT.to_string(),
            descriptions_endpoint: DEFAULT_DESCRIPTIONS_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Everything a pipeline run needs, passed in at construction.
///
/// Every field has a default, so a TOML file only has to name what it changes:
///
/// ```toml
/// images_dir = "/srv/supplier-data/images"
/// target_width = 800
///
/// [upload]
/// images_endpoint = "http://catalog.internal/upload/"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub images_dir: PathBuf,
    pub descriptions_dir: PathBuf,
    pub image_extension: String,
    pub text_extension: String,
    pub target_width: u32,
    pub target_height: u32,
    pub resample_filter: ResampleFilter,
    pub output_format: OutputFormat,
    pub quality: u8,
    /// Worker threads for the conversion stage; 1 keeps it sequential.
    pub jobs: usize,
    pub include_hidden: bool,
    pub upload: UploadConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            descriptions_dir: PathBuf::from(DEFAULT_DESCRIPTIONS_DIR),
            image_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
            text_extension: DEFAULT_TEXT_EXTENSION.to_string(),
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            resample_filter: ResampleFilter::default(),
            output_format: OutputFormat::default(),
            quality: DEFAULT_QUALITY,
            jobs: 1,
            include_hidden: true,
            upload: UploadConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads a TOML file; missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IngestError::InvalidConfig(e.to_string()))
    }

    pub fn target_dimensions(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    pub fn images_dir(&self) -> PathBuf {
        expand_home(&self.images_dir)
    }

    pub fn descriptions_dir(&self) -> PathBuf {
        expand_home(&self.descriptions_dir)
    }

    /// Rejects settings that would make every item fail, or make the
    /// converter overwrite its own inputs.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&self.quality) {
            return Err(IngestError::InvalidConfig(format!(
                "quality {} must be between {} and {}",
                self.quality, MIN_QUALITY, MAX_QUALITY
            )));
        }

        let dims_ok = |d: u32| d > 0 && d <= MAX_TARGET_DIMENSION;
        if !dims_ok(self.target_width) || !dims_ok(self.target_height) {
            return Err(IngestError::InvalidConfig(format!(
                "target dimensions {}x{} must be within 1..={}",
                self.target_width, self.target_height, MAX_TARGET_DIMENSION
            )));
        }

        if self.jobs == 0 {
            return Err(IngestError::InvalidConfig("jobs must be at least 1".into()));
        }

        let image_ext = normalize_extension(&self.image_extension);
        if image_ext.is_empty() || normalize_extension(&self.text_extension).is_empty() {
            return Err(IngestError::InvalidConfig(
                "input extensions must not be empty".into(),
            ));
        }
        if image_ext == self.output_format.extension() {
            return Err(IngestError::InvalidConfig(format!(
                "input extension .{} would be overwritten by {} output",
                image_ext, self.output_format
            )));
        }

        for endpoint in [
            &self.upload.images_endpoint,
            &self.upload.descriptions_endpoint,
        ] {
            reqwest::Url::parse(endpoint).map_err(|e| {
                IngestError::InvalidConfig(format!("invalid endpoint {}: {}", endpoint, e))
            })?;
        }

        if self.upload.timeout_secs == 0 {
            return Err(IngestError::InvalidConfig(
                "timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Lowercases and strips a leading dot, so `".TIF"` and `"tif"` compare equal.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
