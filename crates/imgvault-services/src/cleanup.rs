//! Best-effort artifact removal shared by store rollback and bulk delete.

use imgvault_storage::{LocalStorage, SandboxedPath};

/// Remove every path that exists. Failures are logged and skipped.
///
/// Returns the number of files actually removed.
pub(crate) async fn remove_artifacts(storage: &LocalStorage, paths: &[&SandboxedPath]) -> usize {
    let mut removed = 0;

    for path in paths {
        match storage.remove_if_exists(path).await {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    path = %path.as_path().display(),
                    error = %e,
                    "Failed to remove artifact"
                );
            }
        }
    }

    removed
}
