//! Error types module
//!
//! Failures of the ingestion pipeline are grouped into four kinds: validation of
//! untrusted input, processing by the codec backend, filesystem I/O, and rejected
//! path traversal. Each operation declares which of these it can return.

use std::io;

use crate::models::ImageKind;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for suspicious input and recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Describes how an error should be reported to whoever sits above the core.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "VALIDATION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether the caller can get a different outcome, either by fixing its
    /// input or by retrying later
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Reasons an upload candidate is refused before any filesystem state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Missing content type")]
    MissingContentType,

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too small to contain an image signature")]
    TooSmall,

    #[error("Unrecognized image signature")]
    UnrecognizedSignature,

    #[error("Detected image kind {kind} is not allowed")]
    KindNotAllowed { kind: ImageKind },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Image processing failed: {0}")]
    Processing(String),

    #[error("IO error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Path traversal rejected: {0}")]
    PathTraversal(String),
}

impl ImageError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ImageError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ImageError::Validation(_))
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, ImageError::Processing(_))
    }
}

/// Result type for pipeline operations
pub type ImageResult<T> = Result<T, ImageError>;

/// Static metadata for each variant: (error_code, recoverable, suggested_action, sensitive, log_level).
fn image_error_static_metadata(
    err: &ImageError,
) -> (&'static str, bool, Option<&'static str>, bool, LogLevel) {
    match err {
        ImageError::Validation(_) => (
            "VALIDATION_FAILED",
            true,
            Some("Upload a JPEG, PNG, GIF, BMP or WebP image within the size limit"),
            false,
            LogLevel::Debug,
        ),
        ImageError::Processing(_) => (
            "PROCESSING_FAILED",
            false,
            Some("Check image format and try a different file"),
            false,
            LogLevel::Warn,
        ),
        ImageError::Io { .. } => (
            "IO_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        ImageError::PathTraversal(_) => (
            "PATH_TRAVERSAL_REJECTED",
            false,
            None,
            true,
            LogLevel::Warn,
        ),
    }
}

impl ErrorMetadata for ImageError {
    fn error_code(&self) -> &'static str {
        image_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        image_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        image_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            ImageError::Validation(e) => e.to_string(),
            ImageError::Processing(_) => "Failed to process image".to_string(),
            ImageError::Io { .. } => "Failed to access image storage".to_string(),
            // Indistinguishable from a missing file on purpose.
            ImageError::PathTraversal(_) => "Image not found".to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        image_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        image_error_static_metadata(self).4
    }
}
