//! Magic-byte sniffing of upload payloads.
//!
//! Classification looks only at the leading bytes and ignores whatever content
//! type the client declared. It is a cheap gate, not a decode guarantee.

use imgvault_core::{ImageKind, ValidationError};

/// Longest prefix any supported signature needs.
pub const HEADER_LEN: usize = 12;

/// Fewer bytes than this cannot be classified at all.
const MIN_HEADER_LEN: usize = 3;

const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF_SIGNATURE: &[u8] = b"GIF";
const BMP_SIGNATURE: &[u8] = b"BM";
const RIFF_SIGNATURE: &[u8] = b"RIFF";
const WEBP_FOURCC: &[u8] = b"WEBP";
const WEBP_FOURCC_OFFSET: usize = 8;

/// Reasons a header could not be classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("header too small: {0} bytes")]
    TooSmall(usize),

    #[error("unrecognized image signature")]
    Unrecognized,
}

impl From<SignatureError> for ValidationError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::TooSmall(_) => ValidationError::TooSmall,
            SignatureError::Unrecognized => ValidationError::UnrecognizedSignature,
        }
    }
}

/// Classify a payload by its leading bytes.
///
/// Only the first [`HEADER_LEN`] bytes are inspected; passing the whole payload
/// is fine. Formats are tried in order JPEG, PNG, GIF, BMP, WebP and the first
/// match wins. WebP needs both `RIFF` at offset 0 and `WEBP` at offset 8.
pub fn sniff(data: &[u8]) -> Result<ImageKind, SignatureError> {
    let header = &data[..data.len().min(HEADER_LEN)];

    if header.len() < MIN_HEADER_LEN {
        return Err(SignatureError::TooSmall(header.len()));
    }

    if starts_with_at(header, 0, JPEG_SIGNATURE) {
        return Ok(ImageKind::Jpeg);
    }

    if starts_with_at(header, 0, PNG_SIGNATURE) {
        return Ok(ImageKind::Png);
    }

    if starts_with_at(header, 0, GIF_SIGNATURE) {
        return Ok(ImageKind::Gif);
    }

    if starts_with_at(header, 0, BMP_SIGNATURE) {
        return Ok(ImageKind::Bmp);
    }

    if starts_with_at(header, 0, RIFF_SIGNATURE)
        && starts_with_at(header, WEBP_FOURCC_OFFSET, WEBP_FOURCC)
    {
        return Ok(ImageKind::WebP);
    }

    tracing::debug!(
        header = ?&header[..header.len().min(8)],
        "Unrecognized image signature"
    );
    Err(SignatureError::Unrecognized)
}

fn starts_with_at(data: &[u8], offset: usize, prefix: &[u8]) -> bool {
    data.get(offset..offset + prefix.len()) == Some(prefix)
}
