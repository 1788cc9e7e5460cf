//! Camera driver abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera drivers and mock implementations for testing.
//! The processing core never talks to a driver; it only sees the
//! [`RawFrame`] a driver returns.

use super::{CaptureConfig, RawFrame};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Clone, Error)]
pub enum CameraError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not connected")]
    NotConnected,
}

/// Identification reported by a connected camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraInfo {
    /// Human-readable model name.
    pub model: String,
    /// Vendor model code.
    pub model_code: u16,
    /// Firmware version string.
    pub firmware_version: String,
}

/// Trait for camera drivers.
///
/// Implementations record the message of their most recent failure so
/// that callers which only hold the driver can still report it.
pub trait CameraDriver {
    /// Connects to the camera and applies the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Checks if the camera is currently connected.
    fn is_connected(&self) -> bool;

    /// Exposes the sensor for `exposure_seconds` and reads out one frame.
    fn capture_frame(&mut self, exposure_seconds: f64) -> Result<RawFrame, CameraError>;

    /// Returns the message of the most recent failure, if any.
    fn last_error(&self) -> Option<&str>;

    /// Returns model and firmware information.
    fn info(&self) -> Result<CameraInfo, CameraError>;

    /// Disconnects and releases resources. Closing twice is a no-op.
    fn close(&mut self);
}

/// Mock camera that renders a synthetic star field.
///
/// Frames are deterministic for a given configuration and sequence
/// number, which keeps tests reproducible.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
    last_error: Option<String>,
    pending_failure: Option<String>,
}

const STAR_COUNT: u64 = 12;
const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

impl MockCamera {
    /// Creates a disconnected mock camera.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next capture fail with the given message.
    pub fn fail_next_capture(&mut self, message: impl Into<String>) {
        self.pending_failure = Some(message.into());
    }

    /// Number of frames captured since the last `open`.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn record<T>(&mut self, result: Result<T, CameraError>) -> Result<T, CameraError> {
        if let Err(ref e) = result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    fn render(config: &CaptureConfig, sequence: u64, exposure_seconds: f64) -> RawFrame {
        let factor = config.binning.factor();
        let width = (config.width / factor).max(1);
        let height = (config.height / factor).max(1);
        let max_value = ((1u32 << config.bits_per_pixel) - 1) as f64;

        // Longer exposures collect more signal; binning sums pixels.
        let gain = (exposure_seconds.max(0.001) / 5.0).min(4.0) * (factor * factor) as f64;
        let background = max_value / 50.0;

        // Star positions come from a PCG-style LCG seeded by the sequence.
        let mut state = sequence.wrapping_add(LCG_INCREMENT);
        let mut next = || {
            state = state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
            (state >> 33) as f64 / (1u64 << 31) as f64
        };
        let stars: Vec<(f64, f64, f64)> = (0..STAR_COUNT)
            .map(|_| {
                (
                    next() * width as f64,
                    next() * height as f64,
                    (0.1 + next() * 0.5) * max_value,
                )
            })
            .collect();

        let mut samples = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let gradient = (x + y) as f64 / (width + height) as f64 * background;
                let signal: f64 = stars
                    .iter()
                    .map(|&(sx, sy, peak)| {
                        let d2 = (x as f64 - sx).powi(2) + (y as f64 - sy).powi(2);
                        peak * (-d2 / 4.5).exp()
                    })
                    .sum();
                let value = background + gradient + signal * gain;
                samples.push(value.round().clamp(0.0, max_value) as u16);
            }
        }

        RawFrame::new(width, height, config.bits_per_pixel, samples)
            .with_binning(config.binning)
            .with_exposure(exposure_seconds)
    }
}

impl CameraDriver for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        let result = config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()));
        self.record(result)?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.config.is_some()
    }

    fn capture_frame(&mut self, exposure_seconds: f64) -> Result<RawFrame, CameraError> {
        let Some(config) = self.config.clone() else {
            return self.record(Err(CameraError::NotConnected));
        };
        if let Some(message) = self.pending_failure.take() {
            return self.record(Err(CameraError::CaptureFailed(message)));
        }

        self.sequence += 1;
        let frame = Self::render(&config, self.sequence, exposure_seconds);
        tracing::debug!(
            sequence = self.sequence,
            width = frame.width(),
            height = frame.height(),
            exposure_seconds,
            "MockCamera captured frame"
        );
        Ok(frame)
    }

    fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn info(&self) -> Result<CameraInfo, CameraError> {
        if !self.is_connected() {
            return Err(CameraError::NotConnected);
        }
        Ok(CameraInfo {
            model: "Mock SX".to_string(),
            model_code: 0,
            firmware_version: crate::VERSION.to_string(),
        })
    }

    fn close(&mut self) {
        if self.config.take().is_some() {
            tracing::info!("MockCamera closed");
        }
    }
}
