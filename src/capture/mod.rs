//! Camera input and raw frame handling.
//!
//! This module provides the camera driver abstraction, the raw frame
//! data model handed to the processing core, and run configuration.

mod camera;
mod config;
mod frame;

pub use camera::{CameraDriver, CameraError, CameraInfo, MockCamera};
pub use config::{CaptureConfig, ConfigError, FileConfig, OutputConfig};
pub use frame::{Binning, FrameError, RawFrame, MAX_BITS_PER_PIXEL};
