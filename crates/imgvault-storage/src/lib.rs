//! Filesystem layer for stored images.
//!
//! - [`sandbox`]: path construction and containment checks under the root
//! - [`keys`]: identifier generation and artifact file naming
//! - [`local`]: async read/write/delete/list primitives over sandboxed paths

pub mod error;
pub mod keys;
pub mod local;
pub mod sandbox;

pub use error::{StorageError, StorageResult};
pub use keys::{artifact_file_name, generate_identifier, identifier_from_file_name, ArtifactKind};
pub use local::{LocalStorage, OpenedArtifact};
pub use sandbox::{extract_identifier, normalize, validate_identifier, PathSandbox, SandboxedPath};
