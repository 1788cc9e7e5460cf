//! Per-frame processing: preview raster plus archive container.
//!
//! ```text
//! RawFrame ─┬─ normalize ──► NormalizedRaster ──► JPEG / PGM
//!           │        │
//!           │   FrameStatistics
//!           │        ▼
//!           └──── encode ───► ArchivalContainer ──► .fits
//! ```
//!
//! [`FramePipeline::process`] is pure. [`FramePipeline::save`] is the only
//! step that performs I/O.

use crate::archive::{encode, ArchivalContainer, ArchivalMetadata};
use crate::capture::{FrameError, OutputConfig, RawFrame};
use crate::export::{write_atomic, write_jpeg, write_pgm, ExportError};
use crate::normalize::{normalize, FrameStatistics, NormalizedRaster};
use std::path::{Path, PathBuf};

/// Both derived artifacts of one frame.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    /// 8-bit preview for the photographic compressor.
    pub raster: NormalizedRaster,
    /// Extremes shared by the preview and the archive header.
    pub statistics: FrameStatistics,
    /// Lossless archive bytes.
    pub container: ArchivalContainer,
}

/// Paths written by [`FramePipeline::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    /// JPEG preview.
    pub jpeg: PathBuf,
    /// Archive container.
    pub fits: PathBuf,
    /// PGM preview, when enabled.
    pub pgm: Option<PathBuf>,
}

/// Converts frames into preview and archive artifacts.
#[derive(Debug, Clone, Default)]
pub struct FramePipeline {
    output: OutputConfig,
    metadata: ArchivalMetadata,
}

impl FramePipeline {
    /// Creates a pipeline with the given output settings and header fields.
    pub fn new(output: OutputConfig, metadata: ArchivalMetadata) -> Self {
        Self { output, metadata }
    }

    /// Returns the output settings.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Returns the archive header fields.
    pub fn metadata(&self) -> &ArchivalMetadata {
        &self.metadata
    }

    /// Normalizes and encodes a frame without touching the filesystem.
    pub fn process(&self, frame: &RawFrame) -> Result<ProcessedFrame, FrameError> {
        let raster = normalize(frame, self.output.stretch)?;
        let statistics = raster.statistics();
        let container = encode(frame, &statistics, &self.metadata)?;

        tracing::debug!(
            min = statistics.min_value,
            max = statistics.max_value,
            stretch = self.output.stretch,
            archive_bytes = container.len(),
            "Processed frame"
        );

        Ok(ProcessedFrame {
            raster,
            statistics,
            container,
        })
    }

    /// Writes `<stem>.jpg`, `<stem>.fits` and optionally `<stem>.pgm`
    /// into `dir`.
    pub fn save(
        &self,
        processed: &ProcessedFrame,
        dir: &Path,
        stem: &str,
    ) -> Result<SavedArtifacts, ExportError> {
        let jpeg = dir.join(format!("{stem}.jpg"));
        let fits = dir.join(format!("{stem}.fits"));

        write_jpeg(&processed.raster, self.output.jpeg_quality, &jpeg)?;
        write_atomic(&fits, processed.container.as_bytes())?;

        let pgm = if self.output.write_pgm {
            let path = dir.join(format!("{stem}.pgm"));
            write_pgm(&processed.raster, &path)?;
            Some(path)
        } else {
            None
        };

        tracing::info!(
            jpeg = %jpeg.display(),
            fits = %fits.display(),
            "Saved frame artifacts"
        );
        Ok(SavedArtifacts { jpeg, fits, pgm })
    }
}
