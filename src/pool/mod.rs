//! Substitute image pool.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     images.folder
//!     → ImagePool::load (one directory listing, extension filter)
//!     → Arc<ImagePool> (immutable, shared read-only by every connection)
//!
//! Per request:
//!     ImagePool::choose → PoolEntry → read() bytes + mime()
//! ```
//!
//! # Design Decisions
//! - The pool is never mutated after construction, so no locking
//! - A missing or unreadable folder yields an empty pool, not a startup failure
//! - File contents are read on demand; only paths are held in memory

pub mod entry;

use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use entry::{has_image_extension, mime_for_path, PoolEntry, IMAGE_EXTENSIONS};

/// Errors from picking or reading a pool image.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("image pool is empty")]
    Empty,

    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The set of candidate substitute images.
#[derive(Debug, Default)]
pub struct ImagePool {
    entries: Vec<PoolEntry>,
}

impl ImagePool {
    /// Scan `folder` once for image files. Failures are logged and produce an empty pool.
    pub fn load(folder: &Path) -> Self {
        let dir = match std::fs::read_dir(folder) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::error!(folder = ?folder, error = %e, "Failed to load image pool");
                return Self::default();
            }
        };

        let mut paths: Vec<PathBuf> = dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        paths.sort();

        let pool = Self::from_paths(paths);
        tracing::info!(folder = ?folder, images = pool.len(), "Image pool loaded");
        pool
    }

    /// Build a pool from explicit paths, keeping only accepted image extensions.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let entries = paths
            .into_iter()
            .map(Into::into)
            .filter(|p: &PathBuf| has_image_extension(p))
            .map(PoolEntry::new)
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    /// Pick one entry uniformly at random.
    pub fn choose(&self) -> Result<&PoolEntry, PoolError> {
        self.entries
            .choose(&mut rand::thread_rng())
            .ok_or(PoolError::Empty)
    }
}
