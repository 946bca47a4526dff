use imgvault_core::ImageError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blank storage key")]
    BlankKey,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for keys refused before any filesystem access.
    pub fn is_rejected_key(&self) -> bool {
        matches!(self, StorageError::BlankKey | StorageError::InvalidKey(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for ImageError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BlankKey => ImageError::PathTraversal(String::new()),
            StorageError::InvalidKey(key) => ImageError::PathTraversal(key),
            StorageError::Io { context, source } => ImageError::Io { context, source },
        }
    }
}
