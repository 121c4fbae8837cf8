//! A single substitute image on disk.

use std::path::{Path, PathBuf};

use crate::pool::PoolError;

/// Extensions accepted into the pool (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// MIME type derived purely from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Whether a path carries one of the accepted image extensions.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|ok| e.eq_ignore_ascii_case(ok)))
        .unwrap_or(false)
}

/// A candidate substitute image. Bytes are read lazily on every use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    path: PathBuf,
    mime: &'static str,
}

impl PoolEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime = mime_for_path(&path);
        Self { path, mime }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Read the image bytes from disk.
    pub async fn read(&self) -> Result<Vec<u8>, PoolError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| PoolError::Read {
                path: self.path.clone(),
                source,
            })
    }
}
