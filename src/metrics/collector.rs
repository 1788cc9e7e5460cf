//! Capture metrics registry.

use crate::pipeline::ProcessedFrame;
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics for capture runs.
#[derive(Clone)]
pub struct CaptureMetrics {
    registry: Registry,

    frames_total: IntCounter,
    failures_total: IntCounter,
    run_active: IntGauge,

    last_datamin: IntGauge,
    last_datamax: IntGauge,
    last_exposure_seconds: Gauge,
    archive_bytes_total: IntCounter,
}

impl CaptureMetrics {
    /// Creates a registry with all capture metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_total = IntCounter::new(
            "sx_capture_frames_total",
            "Total number of frames captured and archived",
        )?;
        let failures_total = IntCounter::new(
            "sx_capture_failures_total",
            "Total number of captures whose failure aborted a run",
        )?;
        let run_active = IntGauge::new(
            "sx_capture_run_active",
            "Whether a capture run is in progress (1=running, 0=idle)",
        )?;
        let last_datamin = IntGauge::new(
            "sx_capture_last_datamin",
            "Minimum raw sample value of the most recent frame",
        )?;
        let last_datamax = IntGauge::new(
            "sx_capture_last_datamax",
            "Maximum raw sample value of the most recent frame",
        )?;
        let last_exposure_seconds = Gauge::new(
            "sx_capture_last_exposure_seconds",
            "Exposure time of the most recent frame in seconds",
        )?;
        let archive_bytes_total = IntCounter::new(
            "sx_capture_archive_bytes_total",
            "Total bytes of archive containers produced",
        )?;

        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(run_active.clone()))?;
        registry.register(Box::new(last_datamin.clone()))?;
        registry.register(Box::new(last_datamax.clone()))?;
        registry.register(Box::new(last_exposure_seconds.clone()))?;
        registry.register(Box::new(archive_bytes_total.clone()))?;

        Ok(Self {
            registry,
            frames_total,
            failures_total,
            run_active,
            last_datamin,
            last_datamax,
            last_exposure_seconds,
            archive_bytes_total,
        })
    }

    /// Records a successfully processed frame.
    pub fn record_frame(&self, processed: &ProcessedFrame, exposure_seconds: f64) {
        self.frames_total.inc();
        self.last_datamin.set(processed.statistics.min_value as i64);
        self.last_datamax.set(processed.statistics.max_value as i64);
        self.last_exposure_seconds.set(exposure_seconds);
        self.archive_bytes_total
            .inc_by(processed.container.len() as u64);
    }

    /// Records a failed capture.
    pub fn record_failure(&self) {
        self.failures_total.inc();
    }

    /// Sets the run-active gauge.
    pub fn set_run_active(&self, active: bool) {
        self.run_active.set(if active { 1 } else { 0 });
    }

    /// Returns the number of frames recorded.
    pub fn frames_total(&self) -> u64 {
        self.frames_total.get()
    }

    /// Returns the number of failures recorded.
    pub fn failures_total(&self) -> u64 {
        self.failures_total.get()
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for CaptureMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureMetrics")
            .field("frames_total", &self.frames_total.get())
            .field("failures_total", &self.failures_total.get())
            .finish()
    }
}
