use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{StorageError, StorageResult};
use crate::keys::{identifier_from_file_name, ArtifactKind};
use crate::sandbox::{PathSandbox, SandboxedPath};

/// An artifact opened for reading.
#[derive(Debug)]
pub struct OpenedArtifact {
    pub path: PathBuf,
    pub len: u64,
    pub file: fs::File,
}

/// Flat-directory artifact store on the local filesystem.
///
/// Every operation takes a [`SandboxedPath`], so callers must go through
/// [`LocalStorage::artifact_path`] for each call.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    sandbox: PathSandbox,
    extension: &'static str,
}

impl LocalStorage {
    /// Create a new LocalStorage
    ///
    /// # Arguments
    /// * `root` - Directory holding all artifacts (e.g., "/data/img")
    /// * `extension` - File extension shared by every artifact (e.g., "png")
    pub fn new(root: impl Into<PathBuf>, extension: &'static str) -> Self {
        Self {
            sandbox: PathSandbox::new(root),
            extension,
        }
    }

    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    pub fn extension(&self) -> &'static str {
        self.extension
    }

    pub async fn ensure_root(&self) -> StorageResult<()> {
        self.sandbox.ensure_root().await
    }

    /// Validate `identifier` and build the checked path of one of its artifacts.
    pub fn artifact_path(&self, identifier: &str, kind: ArtifactKind) -> StorageResult<SandboxedPath> {
        self.sandbox
            .resolve_checked(identifier, kind.suffix(), self.extension)
    }

    /// Create (or truncate) the file and write `data` to it.
    pub async fn write(&self, path: &SandboxedPath, data: &[u8]) -> StorageResult<()> {
        let path = path.as_path();
        let start = std::time::Instant::now();

        let mut file = fs::File::create(path)
            .await
            .map_err(|e| StorageError::io(format!("creating {}", path.display()), e))?;

        file.write_all(data)
            .await
            .map_err(|e| StorageError::io(format!("writing {}", path.display()), e))?;

        file.sync_all()
            .await
            .map_err(|e| StorageError::io(format!("syncing {}", path.display()), e))?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifact written"
        );

        Ok(())
    }

    pub async fn read(&self, path: &SandboxedPath) -> StorageResult<Vec<u8>> {
        let path = path.as_path();
        fs::read(path)
            .await
            .map_err(|e| StorageError::io(format!("reading {}", path.display()), e))
    }

    /// Delete the file if present. Returns whether a file was removed.
    pub async fn remove_if_exists(&self, path: &SandboxedPath) -> StorageResult<bool> {
        let path = path.as_path();
        match fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Artifact removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(format!("deleting {}", path.display()), e)),
        }
    }

    /// Open a regular file for reading.
    ///
    /// Missing, non-regular and unreadable files all yield `None`.
    pub async fn open_readable(&self, path: &SandboxedPath) -> Option<OpenedArtifact> {
        let path = path.as_path();

        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Artifact not found");
                return None;
            }
        };
        if !metadata.is_file() {
            tracing::debug!(path = %path.display(), "Artifact is not a regular file");
            return None;
        }

        match fs::File::open(path).await {
            Ok(file) => Some(OpenedArtifact {
                path: path.to_path_buf(),
                len: metadata.len(),
                file,
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Artifact not readable");
                None
            }
        }
    }

    /// Identifiers of all originals under the root, sorted.
    ///
    /// Thumbnails, files with another extension and subdirectories are
    /// skipped. A missing root is treated as empty.
    pub async fn list_identifiers(&self) -> StorageResult<Vec<String>> {
        let root = self.sandbox.root();

        let mut entries = match fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::io(
                    format!("listing {}", root.display()),
                    e,
                ))
            }
        };

        let mut identifiers = Vec::new();
        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::io(format!("listing {}", root.display()), e))?;
            let Some(entry) = entry else {
                break;
            };

            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let file_name = entry.file_name();
            if let Some(identifier) = file_name
                .to_str()
                .and_then(|name| identifier_from_file_name(name, self.extension))
            {
                identifiers.push(identifier);
            }
        }

        identifiers.sort();
        Ok(identifiers)
    }
}
