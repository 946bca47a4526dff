//! Codec backend contract.
//!
//! The orchestrator never touches pixels. It hands bytes to an [`ImageBackend`]
//! to decode, then asks the backend to resize and re-encode the decoded image.
//! [`RustImageBackend`](super::rust_backend::RustImageBackend) is the production
//! implementation; tests substitute their own to force failures.

use image::DynamicImage;
use imgvault_core::{ImageError, OutputFormat};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Not a decodable image: {0}")]
    Decode(String),

    #[error("Image too large: {width}x{height} exceeds {max} pixels")]
    TooManyPixels { width: u32, height: u32, max: u64 },

    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl From<TransformError> for ImageError {
    fn from(err: TransformError) -> Self {
        ImageError::Processing(err.to_string())
    }
}

/// How the decoded image is fitted into the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Scale down, keeping aspect ratio, until the image fits inside the box.
    Fit,
    /// Scale to cover the box, then cut the center to the box's exact shape.
    CenterCrop,
}

/// Parameters for a single resize + encode pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    /// Quality factor in [0, 1]; ignored by lossless formats.
    pub quality: f32,
    pub format: OutputFormat,
    pub crop: CropMode,
}

/// Trait for image codec backends.
pub trait ImageBackend: Send + Sync {
    /// Decode raw bytes into a pixel buffer.
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, TransformError>;

    /// Resize/crop the decoded image and encode it in the requested format.
    fn resize_and_encode(
        &self,
        img: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, TransformError>;
}
