//! Sequenced capture runs.

use super::{RunError, RunGuard, RunTicket};
use crate::capture::{CameraDriver, CaptureConfig, ConfigError};
use crate::export::ExportError;
use crate::metrics::CaptureMetrics;
use crate::pipeline::{FramePipeline, SavedArtifacts};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

const READABLE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// Integration time per frame in seconds.
    pub exposure_seconds: f64,
    /// Frames to capture.
    pub count: u32,
    /// Pause between captures; none after the last.
    pub interval: Duration,
}

impl TryFrom<&CaptureConfig> for CaptureRequest {
    type Error = ConfigError;

    fn try_from(config: &CaptureConfig) -> Result<Self, Self::Error> {
        config.validate()?;
        Ok(Self {
            exposure_seconds: config.exposure_seconds,
            count: config.count,
            interval: config.interval()?,
        })
    }
}

/// One archived capture.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRecord {
    /// Capture time, Unix seconds.
    pub epoch: i64,
    /// Capture time as `YYYY-MM-DD_HH-MM-SS` (UTC).
    pub readable: String,
    /// JPEG preview path.
    pub jpeg: String,
    /// Archive container path.
    pub fits: String,
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Captures in order.
    pub records: Vec<CaptureRecord>,
}

/// Drives a camera through repeated captures.
///
/// `execute` takes `&self` so several threads may share a runner; the
/// internal [`RunGuard`] admits one run at a time.
pub struct CaptureRunner<C: CameraDriver> {
    camera: Mutex<C>,
    pipeline: FramePipeline,
    guard: RunGuard,
    metrics: CaptureMetrics,
    cancel: Arc<AtomicBool>,
}

impl<C: CameraDriver> CaptureRunner<C> {
    /// Creates a runner around an opened camera.
    pub fn new(camera: C, pipeline: FramePipeline) -> Result<Self, RunError> {
        Ok(Self {
            camera: Mutex::new(camera),
            pipeline,
            guard: RunGuard::new(),
            metrics: CaptureMetrics::new()?,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns the run guard, for status reporting.
    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// Returns the metrics registry.
    pub fn metrics(&self) -> &CaptureMetrics {
        &self.metrics
    }

    /// Returns the flag that stops runs between captures when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Consumes the runner and returns the camera.
    pub fn into_camera(self) -> C {
        self.camera.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `request.count` captures.
    ///
    /// Fails with [`RunError::AlreadyRunning`] if another run holds the
    /// guard. Any capture or processing failure aborts the run.
    pub fn execute(&self, request: &CaptureRequest) -> Result<RunSummary, RunError> {
        let ticket = self.guard.try_begin(request.count)?;
        self.metrics.set_run_active(true);

        let result = self.run(request, &ticket);

        self.metrics.set_run_active(false);
        drop(ticket);

        match &result {
            Ok(summary) => tracing::info!(count = summary.records.len(), "Capture run complete"),
            Err(e) => tracing::warn!(error = %e, "Capture run aborted"),
        }
        result
    }

    fn run(
        &self,
        request: &CaptureRequest,
        ticket: &RunTicket,
    ) -> Result<RunSummary, RunError> {
        let dir = self.pipeline.output().directory.clone();
        std::fs::create_dir_all(&dir).map_err(|source| ExportError::Write {
            path: dir.clone(),
            source,
        })?;

        let mut summary = RunSummary::default();
        for _ in 0..request.count {
            if self.is_cancelled() {
                return Err(RunError::Cancelled {
                    completed: summary.records.len(),
                });
            }
            let index = ticket.advance();
            tracing::info!(index, total = request.count, "Capture started");

            match self.capture_one(request, &dir) {
                Ok(record) => summary.records.push(record),
                Err(e) => {
                    self.metrics.record_failure();
                    return Err(e);
                }
            }

            if index < request.count && !request.interval.is_zero() {
                self.pause(request.interval);
            }
        }
        Ok(summary)
    }

    /// Captures, processes and saves a single frame.
    fn capture_one(
        &self,
        request: &CaptureRequest,
        dir: &Path,
    ) -> Result<CaptureRecord, RunError> {
        let frame = {
            let mut camera = self.camera.lock().unwrap_or_else(PoisonError::into_inner);
            match camera.capture_frame(request.exposure_seconds) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        last_error = camera.last_error().unwrap_or(""),
                        "Frame capture failed"
                    );
                    return Err(e.into());
                }
            }
        };

        let processed = self.pipeline.process(&frame)?;
        let captured_at = frame.captured_at();
        let epoch = captured_at.timestamp();
        let stem = unique_stem(dir, epoch);
        let SavedArtifacts { jpeg, fits, .. } = self.pipeline.save(&processed, dir, &stem)?;
        self.metrics
            .record_frame(&processed, frame.exposure_seconds());

        Ok(CaptureRecord {
            epoch,
            readable: captured_at.format(READABLE_FORMAT).to_string(),
            jpeg: jpeg.display().to_string(),
            fits: fits.display().to_string(),
        })
    }

    /// Sleeps for `interval`, waking early on cancellation.
    fn pause(&self, interval: Duration) {
        // An interval past the clock's range only ends on cancellation.
        let deadline = Instant::now().checked_add(interval);
        while !self.is_cancelled() {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => CANCEL_POLL,
            };
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(remaining.min(CANCEL_POLL));
        }
    }
}

/// Returns `<epoch>`, or `<epoch>_<n>` if that name is already taken.
fn unique_stem(dir: &Path, epoch: i64) -> String {
    let taken = |stem: &str| dir.join(format!("{stem}.fits")).exists();
    let base = epoch.to_string();
    if !taken(&base) {
        return base;
    }
    let mut n = 1u32;
    loop {
        let stem = format!("{base}_{n}");
        if !taken(&stem) {
            return stem;
        }
        n += 1;
    }
}
