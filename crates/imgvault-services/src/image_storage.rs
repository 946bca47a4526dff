//! Image storage orchestrator
//!
//! Ties validation, the codec backend and the sandboxed filesystem together.
//! A stored image is the pair `{root}/{id}.{ext}` (resized original) and
//! `{root}/{id}-thumbnail.{ext}` (square thumbnail). Store writes both or
//! leaves neither, Get never reveals why a lookup failed, and bulk delete
//! never fails as a whole.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use imgvault_core::{ImageConfig, ImageError, ImageResult, StorageIdentifier, UploadCandidate};
use imgvault_processing::{
    CropMode, EncodeParams, ImageBackend, RustImageBackend, TransformError, UploadValidator,
};
use imgvault_storage::{
    extract_identifier, generate_identifier, ArtifactKind, LocalStorage, SandboxedPath,
    StorageError,
};
use tokio::io::AsyncReadExt;

use crate::cleanup::remove_artifacts;

/// A stored artifact opened for reading.
#[derive(Debug)]
pub struct StoredImageFile {
    pub path: PathBuf,
    /// MIME type of the configured output format.
    pub content_type: &'static str,
    pub len: u64,
    pub file: tokio::fs::File,
}

impl StoredImageFile {
    /// Read the remaining contents of the file into memory.
    pub async fn read_all(mut self) -> ImageResult<Vec<u8>> {
        let mut buffer = Vec::with_capacity(self.len as usize);
        self.file
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| ImageError::io(format!("reading {}", self.path.display()), e))?;
        Ok(buffer)
    }
}

#[derive(Clone)]
pub struct ImageStorageService {
    config: Arc<ImageConfig>,
    validator: UploadValidator,
    backend: Arc<dyn ImageBackend>,
    storage: LocalStorage,
}

impl ImageStorageService {
    /// Service backed by the `image` crate codec.
    pub fn new(config: ImageConfig) -> anyhow::Result<Self> {
        let backend = Arc::new(RustImageBackend::new(config.max_pixels));
        Self::with_backend(config, backend)
    }

    /// Fails if `config` does not pass [`ImageConfig::validate`].
    pub fn with_backend(
        config: ImageConfig,
        backend: Arc<dyn ImageBackend>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let validator = UploadValidator::from_config(&config);
        let storage = LocalStorage::new(
            config.upload_root.clone(),
            config.output_format.extension(),
        );

        Ok(Self {
            config: Arc::new(config),
            validator,
            backend,
            storage,
        })
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Validate an upload, then persist its resized original and thumbnail.
    ///
    /// Nothing touches the filesystem until validation passes. If anything
    /// fails after that, both target files are removed before the error is
    /// returned.
    #[tracing::instrument(
        skip(self, candidate),
        fields(size_bytes = candidate.data.len(), content_type = ?candidate.content_type)
    )]
    pub async fn store(&self, candidate: UploadCandidate) -> ImageResult<StorageIdentifier> {
        let start = Instant::now();

        let kind = self.validator.validate_all(&candidate).map_err(|e| {
            tracing::debug!(error = %e, "Upload rejected");
            ImageError::from(e)
        })?;

        let identifier = generate_identifier();
        let id = identifier.to_string();

        self.storage.ensure_root().await.map_err(|e| {
            tracing::error!(
                root = %self.storage.root().display(),
                error = %e,
                "Failed to create upload root"
            );
            ImageError::from(e)
        })?;

        let original_path = self.storage.artifact_path(&id, ArtifactKind::Original)?;
        let thumbnail_path = self.storage.artifact_path(&id, ArtifactKind::Thumbnail)?;

        if let Err(e) = self
            .write_artifacts(candidate.data, &original_path, &thumbnail_path)
            .await
        {
            tracing::error!(image_id = %id, error = %e, "Failed to store image, cleaning up");
            let removed =
                remove_artifacts(&self.storage, &[&original_path, &thumbnail_path]).await;
            tracing::debug!(image_id = %id, removed, "Cleanup after failed store finished");
            return Err(e);
        }

        tracing::info!(
            image_id = %id,
            source_kind = %kind,
            format = %self.config.output_format,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image stored"
        );

        Ok(identifier)
    }

    /// Steps after the paths are known: original first, then a thumbnail cut
    /// from the original as written to disk.
    async fn write_artifacts(
        &self,
        data: Vec<u8>,
        original_path: &SandboxedPath,
        thumbnail_path: &SandboxedPath,
    ) -> ImageResult<()> {
        let original_params = EncodeParams {
            width: self.config.max_width,
            height: self.config.max_height,
            quality: self.config.quality,
            format: self.config.output_format,
            crop: CropMode::Fit,
        };
        let original = self.transform(data, original_params).await?;
        self.storage.write(original_path, &original).await?;

        let stored_original = self.storage.read(original_path).await?;

        let thumbnail_params = EncodeParams {
            width: self.config.thumbnail_size,
            height: self.config.thumbnail_size,
            crop: CropMode::CenterCrop,
            ..original_params
        };
        let thumbnail = self.transform(stored_original, thumbnail_params).await?;
        self.storage.write(thumbnail_path, &thumbnail).await?;

        Ok(())
    }

    /// Decode, resize and encode on the blocking pool.
    async fn transform(&self, data: Vec<u8>, params: EncodeParams) -> ImageResult<Vec<u8>> {
        let backend = Arc::clone(&self.backend);

        let encoded = tokio::task::spawn_blocking(move || {
            let img = backend.decode(&data)?;
            backend.resize_and_encode(&img, &params)
        })
        .await
        .map_err(|e| ImageError::Processing(format!("transform task failed: {}", e)))?;

        encoded.map_err(|e| {
            match &e {
                TransformError::Decode(_) | TransformError::TooManyPixels { .. } => {
                    tracing::error!(error = %e, crop = ?params.crop, "Failed to decode image");
                }
                TransformError::Encode(_) => {
                    tracing::error!(error = %e, crop = ?params.crop, "Failed to encode image");
                }
            }
            ImageError::from(e)
        })
    }

    /// Open a stored original or thumbnail.
    ///
    /// Blank or traversal-bearing identifiers, missing files and unreadable
    /// files all return `None`. Rejected identifiers never reach the filesystem.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, identifier: &str, thumbnail: bool) -> Option<StoredImageFile> {
        let kind = ArtifactKind::from_thumbnail_flag(thumbnail);

        let path = match self.storage.artifact_path(identifier, kind) {
            Ok(path) => path,
            Err(e) => {
                log_rejected_identifier(identifier, &e);
                return None;
            }
        };

        let opened = self.storage.open_readable(&path).await?;

        Some(StoredImageFile {
            path: opened.path,
            content_type: self.config.output_format.mime_type(),
            len: opened.len,
            file: opened.file,
        })
    }

    /// Delete the images referenced by each URL, independently and best-effort.
    ///
    /// Unusable URLs are skipped and failures are only logged; the remaining
    /// URLs are always processed.
    #[tracing::instrument(skip(self, urls), fields(count = urls.len()))]
    pub async fn delete_bulk<S: AsRef<str>>(&self, urls: &[S]) {
        let mut deleted_files = 0usize;
        let mut skipped = 0usize;

        for url in urls {
            let url = url.as_ref();

            let Some(identifier) = extract_identifier(url) else {
                tracing::debug!(url = %url, "No identifier in URL, skipping");
                skipped += 1;
                continue;
            };

            let paths = self
                .storage
                .artifact_path(&identifier, ArtifactKind::Original)
                .and_then(|original| {
                    self.storage
                        .artifact_path(&identifier, ArtifactKind::Thumbnail)
                        .map(|thumbnail| (original, thumbnail))
                });
            let (original, thumbnail) = match paths {
                Ok(paths) => paths,
                Err(e) => {
                    log_rejected_identifier(&identifier, &e);
                    skipped += 1;
                    continue;
                }
            };

            let removed = remove_artifacts(&self.storage, &[&original, &thumbnail]).await;
            if removed > 0 {
                tracing::info!(image_id = %identifier, removed, "Image deleted");
            } else {
                tracing::debug!(image_id = %identifier, "Image already absent");
            }
            deleted_files += removed;
        }

        tracing::info!(deleted_files, skipped, "Bulk delete completed");
    }

    /// Identifiers of every stored image, sorted.
    #[tracing::instrument(skip(self))]
    pub async fn list_ids(&self) -> ImageResult<Vec<String>> {
        Ok(self.storage.list_identifiers().await?)
    }
}

fn log_rejected_identifier(identifier: &str, err: &StorageError) {
    match err {
        StorageError::InvalidKey(_) => {
            tracing::warn!(identifier = %identifier, "Path traversal attempt rejected");
        }
        _ => {
            tracing::debug!(error = %err, "Identifier rejected");
        }
    }
}
