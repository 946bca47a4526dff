use imgvault_core::{ImageConfig, ImageKind, UploadCandidate, ValidationError};

use crate::signature;

/// Upload validator
///
/// Runs every check that can be made on an upload without touching the
/// filesystem: size, declared content type, and magic-byte signature. The
/// declared type and the sniffed kind are checked independently against the
/// allow-list, so a spoofed content type never substitutes for real bytes.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size: max_file_size as u64,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(
            config.max_file_size_bytes,
            config.allowed_content_types.clone(),
        )
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the declared content type against the allow-list (case-insensitive,
    /// MIME parameters ignored).
    pub fn validate_content_type(&self, content_type: Option<&str>) -> Result<(), ValidationError> {
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .ok_or(ValidationError::MissingContentType)?;

        let normalized = normalize_mime_type(content_type).to_lowercase();

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(())
    }

    /// Sniff the payload and require the detected kind to be allowed.
    pub fn validate_signature(&self, data: &[u8]) -> Result<ImageKind, ValidationError> {
        let kind = signature::sniff(data)?;

        let allowed = kind
            .mime_types()
            .iter()
            .any(|mime| self.allowed_content_types.iter().any(|ct| ct == mime));
        if !allowed {
            return Err(ValidationError::KindNotAllowed { kind });
        }

        Ok(kind)
    }

    /// Validate all aspects of an upload, returning the sniffed kind.
    pub fn validate_all(&self, candidate: &UploadCandidate) -> Result<ImageKind, ValidationError> {
        let actual_size = candidate.data.len() as u64;
        self.validate_file_size(actual_size)?;
        if candidate.declared_size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: candidate.declared_size,
                max: self.max_file_size,
            });
        }
        self.validate_content_type(candidate.content_type.as_deref())?;
        self.validate_signature(&candidate.data)
    }
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Best-effort content type for a file name, used when a caller has only a path.
pub fn content_type_for_extension(filename: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    fn test_validator() -> UploadValidator {
        UploadValidator::from_config(&ImageConfig::new("/data/img"))
    }

    fn candidate(data: &[u8], content_type: &str) -> UploadCandidate {
        UploadCandidate::new(data.to_vec(), Some(content_type.to_string()))
    }

    #[test]
    fn test_validate_file_size_ok() {
        let validator = test_validator();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
        assert!(validator.validate_file_size(10 * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_file_size(10 * 1024 * 1024 + 1),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = test_validator();
        assert_eq!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        );
    }

    #[test]
    fn test_validate_content_type_ok() {
        let validator = test_validator();
        for ct in ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/bmp", "image/gif"] {
            assert!(validator.validate_content_type(Some(ct)).is_ok(), "{}", ct);
        }
        assert!(validator.validate_content_type(Some("IMAGE/PNG")).is_ok()); // case insensitive
        assert!(validator
            .validate_content_type(Some("image/png; charset=binary"))
            .is_ok());
    }

    #[test]
    fn test_validate_content_type_invalid() {
        let validator = test_validator();
        assert!(matches!(
            validator.validate_content_type(Some("image/svg+xml")),
            Err(ValidationError::InvalidContentType { .. })
        ));
        assert!(matches!(
            validator.validate_content_type(Some("text/plain")),
            Err(ValidationError::InvalidContentType { .. })
        ));
    }

    #[test]
    fn test_validate_content_type_missing() {
        let validator = test_validator();
        assert_eq!(
            validator.validate_content_type(None),
            Err(ValidationError::MissingContentType)
        );
        assert_eq!(
            validator.validate_content_type(Some("  ")),
            Err(ValidationError::MissingContentType)
        );
    }

    #[test]
    fn test_declared_png_with_text_bytes_fails_signature() {
        let validator = test_validator();
        let result = validator.validate_all(&candidate(b"just some text, not a png", "image/png"));
        assert_eq!(result, Err(ValidationError::UnrecognizedSignature));
    }

    #[test]
    fn test_tiny_payload_is_too_small() {
        let validator = test_validator();
        let result = validator.validate_all(&candidate(&[0xFF, 0xD8], "image/jpeg"));
        assert_eq!(result, Err(ValidationError::TooSmall));
    }

    #[test]
    fn test_validate_all_ok() {
        let validator = test_validator();
        assert_eq!(
            validator.validate_all(&candidate(&PNG_HEADER, "image/png")),
            Ok(ImageKind::Png)
        );
    }

    #[test]
    fn test_declared_size_over_limit_rejected() {
        let validator = UploadValidator::new(1024, vec!["image/png".to_string()]);
        let upload = candidate(&PNG_HEADER, "image/png").with_declared_size(4096);
        assert!(matches!(
            validator.validate_all(&upload),
            Err(ValidationError::FileTooLarge { size: 4096, .. })
        ));
    }

    #[test]
    fn test_sniffed_kind_must_be_allowed() {
        let validator = UploadValidator::new(1024, vec!["image/png".to_string(), "image/gif".to_string()]);
        // Declared type passes, but the bytes are a JPEG, which is not allowed here.
        let result = validator.validate_all(&candidate(&[0xFF, 0xD8, 0xFF, 0xE0], "image/png"));
        assert_eq!(
            result,
            Err(ValidationError::KindNotAllowed {
                kind: ImageKind::Jpeg
            })
        );
    }

    #[test]
    fn test_jpg_alias_allows_jpeg_kind() {
        let validator = UploadValidator::new(1024, vec!["image/jpg".to_string()]);
        assert_eq!(
            validator.validate_all(&candidate(&[0xFF, 0xD8, 0xFF, 0xE0], "image/jpg")),
            Ok(ImageKind::Jpeg)
        );
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("a.JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for_extension("dir/b.webp"), Some("image/webp"));
        assert_eq!(content_type_for_extension("notes.txt"), None);
        assert_eq!(content_type_for_extension("README"), None);
    }
}
