//! Capture run sequencing.
//!
//! A run captures a fixed number of frames, pushes each through the
//! [`FramePipeline`](crate::pipeline::FramePipeline) and records where
//! the artifacts landed. Only one run may be active at a time; the guard
//! is an explicit Idle/Running state machine rather than a loose flag.

mod runner;
mod state;

pub use runner::{CaptureRecord, CaptureRequest, CaptureRunner, RunSummary};
pub use state::{RunGuard, RunState, RunStatus, RunTicket};

use crate::capture::{CameraError, FrameError};
use crate::export::ExportError;
use crate::metrics::MetricsError;
use thiserror::Error;

/// Errors that end a capture run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("a capture run is already in progress")]
    AlreadyRunning,
    #[error("capture run cancelled after {completed} frame(s)")]
    Cancelled { completed: usize },
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}
