//! Identifier generation and artifact naming.
//!
//! Layout: `{root}/{id}.{ext}` for the resized original and
//! `{root}/{id}-thumbnail.{ext}` for the thumbnail. No subdirectories.

use imgvault_core::{StorageIdentifier, THUMBNAIL_SUFFIX};
use uuid::Uuid;

/// Generate a fresh random (v4) storage identifier.
///
/// Collisions are negligible, so no check against existing files is made.
pub fn generate_identifier() -> StorageIdentifier {
    StorageIdentifier::from_uuid(Uuid::new_v4())
}

/// Which of the two artifacts of a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Original,
    Thumbnail,
}

impl ArtifactKind {
    pub fn from_thumbnail_flag(thumbnail: bool) -> Self {
        if thumbnail {
            ArtifactKind::Thumbnail
        } else {
            ArtifactKind::Original
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Original => "",
            ArtifactKind::Thumbnail => THUMBNAIL_SUFFIX,
        }
    }
}

/// File name of an artifact, e.g. `{id}-thumbnail.png`.
pub fn artifact_file_name(identifier: &str, suffix: &str, extension: &str) -> String {
    format!("{}{}.{}", identifier, suffix, extension)
}

/// Recover the identifier from an original-artifact file name.
///
/// Returns `None` for thumbnails and for files with another extension.
pub fn identifier_from_file_name(file_name: &str, extension: &str) -> Option<String> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    if stem.is_empty() || stem.ends_with(THUMBNAIL_SUFFIX) {
        return None;
    }
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_identifiers_are_unique_v4() {
        let a = generate_identifier();
        let b = generate_identifier();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn test_artifact_file_names() {
        let id = "3f1c2a9e-0000-4000-8000-000000000001";
        assert_eq!(
            artifact_file_name(id, ArtifactKind::Original.suffix(), "png"),
            format!("{}.png", id)
        );
        assert_eq!(
            artifact_file_name(id, ArtifactKind::Thumbnail.suffix(), "png"),
            format!("{}-thumbnail.png", id)
        );
    }

    #[test]
    fn test_identifier_from_file_name() {
        assert_eq!(
            identifier_from_file_name("abc.png", "png"),
            Some("abc".to_string())
        );
        assert_eq!(identifier_from_file_name("abc-thumbnail.png", "png"), None);
        assert_eq!(identifier_from_file_name("abc.jpg", "png"), None);
        assert_eq!(identifier_from_file_name("abcpng", "png"), None);
        assert_eq!(identifier_from_file_name(".png", "png"), None);
    }

    #[test]
    fn test_thumbnail_flag() {
        assert_eq!(ArtifactKind::from_thumbnail_flag(true), ArtifactKind::Thumbnail);
        assert_eq!(ArtifactKind::from_thumbnail_flag(false), ArtifactKind::Original);
    }
}
