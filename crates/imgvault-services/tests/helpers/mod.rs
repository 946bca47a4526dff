//! Shared fixtures for orchestrator integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imgvault_core::{ImageConfig, UploadCandidate};
use imgvault_processing::{
    CropMode, EncodeParams, ImageBackend, RustImageBackend, TransformError,
};
use imgvault_services::ImageStorageService;

/// Encode a solid-colour image of the given size.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([200, 40, 90, 255]),
    ));
    let img = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
    buffer
}

pub fn png_upload(width: u32, height: u32) -> UploadCandidate {
    UploadCandidate::new(
        image_bytes(width, height, ImageFormat::Png),
        Some("image/png".to_string()),
    )
}

pub fn jpeg_upload(width: u32, height: u32) -> UploadCandidate {
    UploadCandidate::new(
        image_bytes(width, height, ImageFormat::Jpeg),
        Some("image/jpeg".to_string()),
    )
}

pub fn service_at(root: &Path) -> ImageStorageService {
    ImageStorageService::new(ImageConfig::new(root)).unwrap()
}

/// Names of the regular files directly under `root`, sorted. Empty if `root` is missing.
pub fn files_in(root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Delegates to the real backend but refuses to produce thumbnails.
pub struct FailingThumbnailBackend {
    inner: RustImageBackend,
}

impl FailingThumbnailBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RustImageBackend::new(50_000_000),
        })
    }
}

impl ImageBackend for FailingThumbnailBackend {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, TransformError> {
        self.inner.decode(data)
    }

    fn resize_and_encode(
        &self,
        img: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, TransformError> {
        match params.crop {
            CropMode::CenterCrop => Err(TransformError::Encode(
                "thumbnail encoder unavailable".to_string(),
            )),
            CropMode::Fit => self.inner.resize_and_encode(img, params),
        }
    }
}
