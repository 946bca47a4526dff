//! imgvault Services
//!
//! The storage orchestrator: store, get, bulk delete and listing of images on
//! top of the processing and storage crates.

mod cleanup;
pub mod image_storage;

pub use image_storage::{ImageStorageService, StoredImageFile};
