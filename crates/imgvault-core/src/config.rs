//! Configuration module
//!
//! `ImageConfig` is built once at startup and handed to each component; nothing
//! in the pipeline reads configuration from ambient state after that.

use std::env;
use std::path::PathBuf;

use crate::models::OutputFormat;

const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;
const MAX_WIDTH: u32 = 500;
const MAX_HEIGHT: u32 = 500;
const THUMBNAIL_SIZE: u32 = 150;
const QUALITY: f32 = 0.85;
const MAX_PIXELS: u64 = 50_000_000;
const ALLOWED_CONTENT_TYPES: &str =
    "image/jpeg,image/jpg,image/png,image/webp,image/bmp,image/gif";

/// Image ingestion configuration
#[derive(Clone, Debug)]
pub struct ImageConfig {
    /// Sandbox root; every artifact lives directly inside it.
    pub upload_root: PathBuf,
    pub max_file_size_bytes: usize,
    pub max_width: u32,
    pub max_height: u32,
    /// Side length of the square thumbnail.
    pub thumbnail_size: u32,
    /// Output quality factor in [0, 1].
    pub quality: f32,
    pub output_format: OutputFormat,
    /// Decoded images with more pixels than this are refused.
    pub max_pixels: u64,
    pub allowed_content_types: Vec<String>,
}

impl ImageConfig {
    /// Configuration with default limits rooted at `upload_root`.
    pub fn new(upload_root: impl Into<PathBuf>) -> Self {
        Self {
            upload_root: upload_root.into(),
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            thumbnail_size: THUMBNAIL_SIZE,
            quality: QUALITY,
            output_format: OutputFormat::default(),
            max_pixels: MAX_PIXELS,
            allowed_content_types: split_list(ALLOWED_CONTENT_TYPES),
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upload_root = lookup("IMAGES_UPLOAD_ROOT")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("IMAGES_UPLOAD_ROOT must be set"))?;

        let mut config = Self::new(upload_root.trim());

        if let Some(v) = lookup("IMAGES_MAX_FILE_SIZE") {
            config.max_file_size_bytes = v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("IMAGES_MAX_FILE_SIZE must be a valid number"))?;
        }
        if let Some(v) = lookup("IMAGES_MAX_WIDTH") {
            config.max_width = v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("IMAGES_MAX_WIDTH must be a valid number"))?;
        }
        if let Some(v) = lookup("IMAGES_MAX_HEIGHT") {
            config.max_height = v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("IMAGES_MAX_HEIGHT must be a valid number"))?;
        }
        if let Some(v) = lookup("IMAGES_THUMBNAIL_SIZE") {
            config.thumbnail_size = v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("IMAGES_THUMBNAIL_SIZE must be a valid number"))?;
        }
        if let Some(v) = lookup("IMAGES_QUALITY") {
            config.quality = v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("IMAGES_QUALITY must be a number in [0, 1]"))?;
        }
        if let Some(v) = lookup("IMAGES_OUTPUT_FORMAT") {
            config.output_format = OutputFormat::parse(&v)?;
        }
        if let Some(v) = lookup("IMAGES_MAX_PIXELS") {
            config.max_pixels = v
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("IMAGES_MAX_PIXELS must be a valid number"))?;
        }
        if let Some(v) = lookup("IMAGES_ALLOWED_CONTENT_TYPES") {
            config.allowed_content_types = split_list(&v);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("IMAGES_UPLOAD_ROOT must not be empty"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("IMAGES_MAX_FILE_SIZE must be greater than 0"));
        }

        if self.max_width == 0 || self.max_height == 0 || self.thumbnail_size == 0 {
            return Err(anyhow::anyhow!(
                "IMAGES_MAX_WIDTH, IMAGES_MAX_HEIGHT and IMAGES_THUMBNAIL_SIZE must be greater than 0"
            ));
        }

        if !(0.0..=1.0).contains(&self.quality) {
            return Err(anyhow::anyhow!(
                "IMAGES_QUALITY must be between 0 and 1 (got {})",
                self.quality
            ));
        }

        if self.max_pixels == 0 {
            return Err(anyhow::anyhow!("IMAGES_MAX_PIXELS must be greater than 0"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "IMAGES_ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        Ok(())
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
