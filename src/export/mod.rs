//! Writing processed frames to disk.
//!
//! The processing core returns complete byte buffers; this module is the
//! only place that touches the filesystem. Every file is written to a
//! temporary sibling first and renamed into place, so readers never see
//! a partial file.

mod jpeg;
mod pgm;

pub use jpeg::{encode_jpeg, write_jpeg, DEFAULT_JPEG_QUALITY};
pub use pgm::{encode_pgm, write_pgm};

use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while exporting artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("image compression failed: {0}")]
    Compression(#[from] image::ImageError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes `bytes` to `path` atomically.
///
/// The data goes to a temporary file in the destination directory,
/// is synced, then renamed over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let wrap = |source: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(bytes).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
    Ok(())
}
