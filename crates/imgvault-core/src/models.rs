//! Shared domain types for the ingestion pipeline.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Suffix appended to an identifier to name its thumbnail artifact.
pub const THUMBNAIL_SUFFIX: &str = "-thumbnail";

/// An upload as received from the transport layer.
///
/// Both `content_type` and `declared_size` come straight from the client and
/// are never trusted on their own; the payload bytes are the authority.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub declared_size: u64,
}

impl UploadCandidate {
    pub fn new(data: Vec<u8>, content_type: Option<String>) -> Self {
        let declared_size = data.len() as u64;
        Self {
            data,
            content_type,
            declared_size,
        }
    }

    /// Override the client-reported size (e.g. a multipart part length).
    pub fn with_declared_size(mut self, declared_size: u64) -> Self {
        self.declared_size = declared_size;
        self
    }
}

/// Opaque identifier of a stored image (UUID v4, canonical hyphenated text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageIdentifier(Uuid);

impl StorageIdentifier {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for StorageIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Image formats recognised by signature sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
}

impl ImageKind {
    /// Content types under which this kind may be declared.
    pub fn mime_types(self) -> &'static [&'static str] {
        match self {
            ImageKind::Jpeg => &["image/jpeg", "image/jpg"],
            ImageKind::Png => &["image/png"],
            ImageKind::Gif => &["image/gif"],
            ImageKind::Bmp => &["image/bmp"],
            ImageKind::WebP => &["image/webp"],
        }
    }
}

impl Display for ImageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ImageKind::Jpeg => write!(f, "jpeg"),
            ImageKind::Png => write!(f, "png"),
            ImageKind::Gif => write!(f, "gif"),
            ImageKind::Bmp => write!(f, "bmp"),
            ImageKind::WebP => write!(f, "webp"),
        }
    }
}

/// Encoding applied to every stored artifact, regardless of what was uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, anyhow::Error> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(anyhow::anyhow!("Invalid output format: {}", s)),
        }
    }

    /// File extension used on disk, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_identifier_is_canonical_uuid_text() {
        let id = StorageIdentifier::from_uuid(Uuid::new_v4());
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(text.matches('-').count(), 4);
        assert_eq!(Uuid::parse_str(&text).unwrap(), id.as_uuid());
    }

    #[test]
    fn test_storage_identifier_serializes_as_string() {
        let id = StorageIdentifier::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("PNG").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::parse("jpg").unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::parse(" webp ").unwrap(), OutputFormat::WebP);
        assert!(OutputFormat::parse("tiff").is_err());
    }

    #[test]
    fn test_output_format_extension_and_mime() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::default(), OutputFormat::Png);
    }

    #[test]
    fn test_jpeg_kind_accepts_both_mime_spellings() {
        assert!(ImageKind::Jpeg.mime_types().contains(&"image/jpg"));
        assert!(ImageKind::Jpeg.mime_types().contains(&"image/jpeg"));
    }

    #[test]
    fn test_upload_candidate_declared_size_defaults_to_len() {
        let candidate = UploadCandidate::new(vec![1, 2, 3], None);
        assert_eq!(candidate.declared_size, 3);
        let candidate = candidate.with_declared_size(10);
        assert_eq!(candidate.declared_size, 10);
    }
}
