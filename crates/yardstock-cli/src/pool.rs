//! Loads an image pool from a local folder.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use yardstock_core::UploadedFile;

/// Reads every regular file directly inside `dir`, sorted by filename so
/// that lookup collisions resolve the same way on every run.
pub(crate) fn load_image_pool(dir: &Path) -> anyhow::Result<Vec<Arc<UploadedFile>>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read image folder {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let files = paths
        .iter()
        .map(|path| {
            UploadedFile::from_path(path)
                .map(Arc::new)
                .with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::debug!(folder = %dir.display(), files = files.len(), "image pool loaded");
    Ok(files)
}
