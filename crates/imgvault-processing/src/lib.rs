//! imgvault Processing Library
//!
//! Everything that looks at upload bytes lives here: magic-byte sniffing, upload
//! validation, and the codec backend that decodes, resizes and re-encodes images.

pub mod image;
pub mod signature;
pub mod validator;

pub use crate::image::{
    CropMode, EncodeParams, ImageBackend, RustImageBackend, TransformError,
};
pub use signature::{sniff, SignatureError, HEADER_LEN};
pub use validator::{content_type_for_extension, UploadValidator};
