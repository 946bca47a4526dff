//! Pure-Rust codec backend built on the `image` crate.
//!
//! | Operation | Implementation |
//! |-----------|----------------|
//! | Decode | `ImageReader::with_guessed_format`, header dimensions checked against the pixel bound, then `decode` |
//! | Fit resize | `DynamicImage::resize_exact` to [`fit_within`] dimensions, `Lanczos3` |
//! | Center crop | `DynamicImage::resize_to_fill` to [`fill_target`] dimensions, `Lanczos3` |
//! | PNG | `image` PNG encoder (lossless) |
//! | JPEG | `image` JPEG encoder, quality scaled to 1-100 |
//! | WebP | libwebp via the `webp` crate (lossy); lossless `image` encoder without the feature |

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use imgvault_core::OutputFormat;

use super::backend::{CropMode, EncodeParams, ImageBackend, TransformError};
use super::calculations::{fill_target, fit_within};

/// Production backend. Holds only the decode pixel bound.
#[derive(Debug, Clone)]
pub struct RustImageBackend {
    max_pixels: u64,
}

impl RustImageBackend {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }
}

fn resize(img: &DynamicImage, params: &EncodeParams) -> DynamicImage {
    let source = img.dimensions();
    let bound = (params.width, params.height);

    match params.crop {
        CropMode::Fit => {
            let (w, h) = fit_within(source, bound);
            if (w, h) == source {
                img.clone()
            } else {
                img.resize_exact(w, h, FilterType::Lanczos3)
            }
        }
        CropMode::CenterCrop => {
            let (w, h) = fill_target(source, bound);
            img.resize_to_fill(w, h, FilterType::Lanczos3)
        }
    }
}

fn encode(img: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>, TransformError> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
        OutputFormat::Jpeg => {
            let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            // JPEG has no alpha channel.
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
                .map_err(|e| TransformError::Encode(e.to_string()))?;
        }
        OutputFormat::WebP => {
            buffer = encode_webp(img, quality)?;
        }
    }

    Ok(buffer)
}

#[cfg(feature = "webp")]
fn encode_webp(img: &DynamicImage, quality: f32) -> Result<Vec<u8>, TransformError> {
    let (width, height) = img.dimensions();
    let rgba_img = img.to_rgba8();

    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    let webp_data = encoder.encode((quality * 100.0).clamp(0.0, 100.0));

    Ok(webp_data.to_vec())
}

#[cfg(not(feature = "webp"))]
fn encode_webp(img: &DynamicImage, _quality: f32) -> Result<Vec<u8>, TransformError> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(img.to_rgba8())
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::WebP)
        .map_err(|e| TransformError::Encode(e.to_string()))?;
    Ok(buffer)
}

fn guessed_reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, TransformError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(e.to_string()))
}

impl ImageBackend for RustImageBackend {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage, TransformError> {
        // Header only; nothing is allocated for pixels until the bound holds.
        let (width, height) = guessed_reader(data)?
            .into_dimensions()
            .map_err(|e| TransformError::Decode(e.to_string()))?;
        if width as u64 * height as u64 > self.max_pixels {
            return Err(TransformError::TooManyPixels {
                width,
                height,
                max: self.max_pixels,
            });
        }

        guessed_reader(data)?
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))
    }

    fn resize_and_encode(
        &self,
        img: &DynamicImage,
        params: &EncodeParams,
    ) -> Result<Vec<u8>, TransformError> {
        let resized = resize(img, params);
        tracing::debug!(
            source = ?img.dimensions(),
            output = ?resized.dimensions(),
            format = %params.format,
            crop = ?params.crop,
            "Resized image"
        );
        encode(&resized, params.format, params.quality)
    }
}
