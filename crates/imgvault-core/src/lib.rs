//! imgvault Core Library
//!
//! This crate provides the configuration, error taxonomy and domain types shared
//! by every imgvault component.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::ImageConfig;
pub use error::{ErrorMetadata, ImageError, ImageResult, LogLevel, ValidationError};
pub use models::{
    ImageKind, OutputFormat, StorageIdentifier, UploadCandidate, THUMBNAIL_SUFFIX,
};
