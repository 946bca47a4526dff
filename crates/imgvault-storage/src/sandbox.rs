//! Path sandbox
//!
//! Every path handed to the filesystem is built from the configured root and
//! proven, after lexical normalization, to sit strictly below it. The proof is
//! made per call and never cached: a [`SandboxedPath`] only lives as long as
//! the operation that produced it.
//!
//! Normalization is purely lexical so that a rejected path never causes any
//! filesystem access, not even a `stat`.

use std::path::{Component, Path, PathBuf};

use crate::error::{StorageError, StorageResult};
use crate::keys::artifact_file_name;

/// A path proven to lie inside the sandbox root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxedPath(PathBuf);

impl SandboxedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for SandboxedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Builds and checks paths under a single root directory.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    /// Root as configured (used for directory creation and display).
    root: PathBuf,
    /// Normalized absolute root (used for containment checks).
    normalized_root: PathBuf,
}

impl PathSandbox {
    /// A relative `root` is anchored to the current directory once, here, so
    /// later working-directory changes do not move the sandbox.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        let normalized_root = normalize(&root);
        Self {
            root,
            normalized_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join root, identifier, suffix and extension. Performs no validation.
    pub fn resolve(&self, identifier: &str, suffix: &str, extension: &str) -> PathBuf {
        self.root
            .join(artifact_file_name(identifier, suffix, extension))
    }

    /// True iff the normalized candidate is a strict descendant of the normalized root.
    pub fn contains(&self, candidate: &Path) -> bool {
        let normalized = normalize(candidate);
        normalized != self.normalized_root && normalized.starts_with(&self.normalized_root)
    }

    /// Validate an untrusted identifier, resolve it, and prove containment.
    pub fn resolve_checked(
        &self,
        identifier: &str,
        suffix: &str,
        extension: &str,
    ) -> StorageResult<SandboxedPath> {
        validate_identifier(identifier)?;

        let candidate = self.resolve(identifier, suffix, extension);
        if !self.contains(&candidate) {
            return Err(StorageError::InvalidKey(identifier.to_string()));
        }

        Ok(SandboxedPath(normalize(&candidate)))
    }

    /// Create the root directory (and parents) if it does not exist yet.
    pub async fn ensure_root(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            StorageError::io(
                format!("creating storage directory {}", self.root.display()),
                e,
            )
        })
    }
}

/// Reject identifiers that are blank or could step outside the root.
pub fn validate_identifier(identifier: &str) -> StorageResult<()> {
    if identifier.trim().is_empty() {
        return Err(StorageError::BlankKey);
    }

    if identifier.contains("..")
        || identifier.contains('/')
        || identifier.contains('\\')
        || identifier.contains('\0')
    {
        return Err(StorageError::InvalidKey(identifier.to_string()));
    }

    Ok(())
}

/// Collapse `.` and `..` segments into an absolute path without touching the filesystem.
///
/// Relative paths are anchored at the current working directory. `..` at the
/// filesystem root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Pull the candidate identifier out of a URL-like string.
///
/// Takes the text after the last `/`, drops everything from the first `?`,
/// then drops a trailing extension (text after the last `.`, when that dot is
/// not the first character). The result is untrusted and must still pass
/// [`validate_identifier`]. Returns `None` when nothing is left.
pub fn extract_identifier(url: &str) -> Option<String> {
    let last_segment = url.trim_end_matches('/').rsplit('/').next()?;

    let without_query = match last_segment.find('?') {
        Some(index) => &last_segment[..index],
        None => last_segment,
    };

    let identifier = match without_query.rfind('.') {
        Some(index) if index > 0 => &without_query[..index],
        _ => without_query,
    };

    if identifier.trim().is_empty() {
        None
    } else {
        Some(identifier.to_string())
    }
}
