//! SX Capture Library
//!
//! Turns raw CCD frames into two artifacts: an 8-bit preview raster for
//! JPEG compression, and a bit-exact FITS container for archival.
//!
//! # Architecture
//!
//! ```text
//! capture → normalize ──► export (JPEG/PGM)
//!     │         │ statistics
//!     └──────► archive ──► export (atomic .fits write)
//!
//! orchestrator: sequences captures, one run at a time
//! ```
//!
//! # Design Principles
//!
//! - **Pure core**: `normalize` and `encode` perform no I/O and hold no state
//! - **Lossless archive**: the container is built from the raw samples, never the preview
//! - **One source of extremes**: preview stretch and `DATAMIN`/`DATAMAX` share one scan
//! - **Fail fast**: malformed frames are rejected before any output is produced
//!
//! # Example
//!
//! ```no_run
//! use sx_capture::{
//!     archive::{encode, ArchivalMetadata},
//!     capture::{CameraDriver, CaptureConfig, MockCamera},
//!     normalize::normalize,
//! };
//!
//! let mut camera = MockCamera::new();
//! camera.open(&CaptureConfig::default()).unwrap();
//! let frame = camera.capture_frame(5.0).unwrap();
//!
//! let raster = normalize(&frame, true).unwrap();
//! let container = encode(&frame, &raster.statistics(), &ArchivalMetadata::default()).unwrap();
//!
//! assert_eq!(container.len() % 2880, 0);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod archive;
pub mod capture;
pub mod export;
pub mod metrics;
pub mod normalize;
pub mod orchestrator;
pub mod pipeline;

// Re-export commonly used types at crate root
pub use archive::{encode, ArchivalContainer, ArchivalMetadata};
pub use capture::{Binning, CameraDriver, CaptureConfig, FrameError, MockCamera, RawFrame};
pub use normalize::{normalize, FrameStatistics, NormalizedRaster};
pub use orchestrator::{CaptureRequest, CaptureRunner, RunError};
pub use pipeline::{FramePipeline, ProcessedFrame};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
