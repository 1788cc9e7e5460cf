//! Prometheus metrics for capture runs.
//!
//! # Metrics Exposed
//!
//! - `sx_capture_frames_total` - Frames captured and archived
//! - `sx_capture_failures_total` - Captures whose failure aborted a run
//! - `sx_capture_run_active` - Run state (1=running, 0=idle)
//! - `sx_capture_last_datamin` / `sx_capture_last_datamax` - Raw extremes of the latest frame
//! - `sx_capture_last_exposure_seconds` - Exposure of the latest frame
//! - `sx_capture_archive_bytes_total` - Archive bytes produced
//!
//! Serving these over HTTP is left to the embedding application; the
//! CLI prints them with `--print-metrics`.

mod collector;

pub use collector::{CaptureMetrics, MetricsError};
