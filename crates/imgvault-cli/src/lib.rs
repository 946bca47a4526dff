use std::path::{Path, PathBuf};

use anyhow::Context;
use imgvault_core::{ErrorMetadata, ImageError, ImageResult, UploadCandidate};
use imgvault_processing::content_type_for_extension;
use imgvault_services::ImageStorageService;
use serde::Serialize;

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("imgvault=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Read a file from disk as an upload, declaring the given content type or
/// one inferred from the file extension.
pub async fn read_upload(path: &Path, content_type: Option<String>) -> ImageResult<UploadCandidate> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| ImageError::io(format!("reading {}", path.display()), e))?;

    let content_type = content_type.or_else(|| {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(content_type_for_extension)
            .map(str::to_string)
    });

    Ok(UploadCandidate::new(data, content_type))
}

#[derive(Debug, Serialize)]
pub struct SeededFile {
    pub file: PathBuf,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub file: PathBuf,
    pub error_code: &'static str,
    pub error: String,
}

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub stored: Vec<SeededFile>,
    pub failed: Vec<FailedFile>,
}

/// Store every regular file in `dir` (non-recursive, in name order).
///
/// Per-file failures are collected in the report; only an unreadable
/// directory aborts the run.
pub async fn seed_directory(service: &ImageStorageService, dir: &Path) -> anyhow::Result<SeedReport> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let is_file = entry
            .file_type()
            .await
            .map(|file_type| file_type.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(entry.path());
        }
    }
    files.sort();

    Ok(seed_files(service, files).await)
}

/// Store each file in order, recording every outcome.
///
/// A file that cannot be read is reported like any other failed store and the
/// run continues.
pub async fn seed_files(
    service: &ImageStorageService,
    files: impl IntoIterator<Item = PathBuf>,
) -> SeedReport {
    let mut report = SeedReport::default();

    for file in files {
        let candidate = match read_upload(&file, None).await {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "Failed to read seed file");
                report.failed.push(FailedFile {
                    file,
                    error_code: e.error_code(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        match service.store(candidate).await {
            Ok(id) => {
                tracing::info!(file = %file.display(), image_id = %id, "Seeded image");
                report.stored.push(SeededFile {
                    file,
                    id: id.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "Failed to seed image");
                report.failed.push(FailedFile {
                    file,
                    error_code: e.error_code(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbImage};
    use imgvault_core::ImageConfig;

    fn write_png(path: &Path) {
        let img = DynamicImage::ImageRgb8(RgbImage::new(12, 8));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        std::fs::write(path, buffer).unwrap();
    }

    #[tokio::test]
    async fn read_upload_infers_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.JPG");
        std::fs::write(&path, b"bytes").unwrap();

        let candidate = read_upload(&path, None).await.unwrap();
        assert_eq!(candidate.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(candidate.declared_size, 5);

        let candidate = read_upload(&path, Some("image/png".to_string())).await.unwrap();
        assert_eq!(candidate.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn read_upload_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_upload(&dir.path().join("absent.png"), None).await.is_err());
    }

    #[tokio::test]
    async fn seed_directory_reports_each_file() {
        let samples = tempfile::tempdir().unwrap();
        write_png(&samples.path().join("a.png"));
        write_png(&samples.path().join("b.png"));
        std::fs::write(samples.path().join("readme.txt"), b"not an image").unwrap();
        std::fs::create_dir(samples.path().join("nested")).unwrap();

        let store = tempfile::tempdir().unwrap();
        let service = ImageStorageService::new(ImageConfig::new(store.path())).unwrap();

        let report = seed_directory(&service, samples.path()).await.unwrap();

        assert_eq!(report.stored.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].error_code, "VALIDATION_FAILED");
        assert!(report.failed[0].file.ends_with("readme.txt"));

        let mut ids: Vec<String> = report.stored.iter().map(|s| s.id.clone()).collect();
        ids.sort();
        assert_eq!(service.list_ids().await.unwrap(), ids);
    }

    #[tokio::test]
    async fn seed_files_continues_past_unreadable_file() {
        let samples = tempfile::tempdir().unwrap();
        write_png(&samples.path().join("a.png"));
        write_png(&samples.path().join("c.png"));

        let store = tempfile::tempdir().unwrap();
        let service = ImageStorageService::new(ImageConfig::new(store.path())).unwrap();

        let files = vec![
            samples.path().join("a.png"),
            samples.path().join("b.png"),
            samples.path().join("c.png"),
        ];
        let report = seed_files(&service, files).await;

        assert_eq!(report.stored.len(), 2);
        assert!(report.stored[1].file.ends_with("c.png"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].error_code, "IO_FAILED");
        assert!(report.failed[0].file.ends_with("b.png"));
        assert!(report.failed[0].error.contains("b.png"));
    }

    #[tokio::test]
    async fn seed_missing_directory_is_error() {
        let store = tempfile::tempdir().unwrap();
        let service = ImageStorageService::new(ImageConfig::new(store.path())).unwrap();

        assert!(seed_directory(&service, &store.path().join("absent"))
            .await
            .is_err());
    }
}
