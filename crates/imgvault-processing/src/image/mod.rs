//! Image processing module
//!
//! This module provides the codec boundary used by the storage pipeline:
//! - The backend contract (backend)
//! - Pure size arithmetic for fit and center-crop passes (calculations)
//! - The `image`-crate implementation (rust_backend)

pub mod backend;
pub mod calculations;
pub mod rust_backend;

pub use backend::{CropMode, EncodeParams, ImageBackend, TransformError};
pub use rust_backend::RustImageBackend;
