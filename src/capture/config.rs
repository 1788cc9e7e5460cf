//! Capture and output configuration.
//!
//! Every field has a default so a partial (or empty) TOML file is valid.

use super::frame::{Binning, MAX_BITS_PER_PIXEL};
use crate::archive::ArchivalMetadata;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a capture run and the mock sensor geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Integration time per frame in seconds.
    pub exposure_seconds: f64,
    /// Frames captured per run.
    pub count: u32,
    /// Pause between consecutive captures in seconds.
    pub interval_seconds: f64,
    /// Unbinned sensor width in pixels.
    pub width: u32,
    /// Unbinned sensor height in pixels.
    pub height: u32,
    /// Effective sample depth.
    pub bits_per_pixel: u8,
    /// On-chip binning mode.
    pub binning: Binning,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            exposure_seconds: 5.0,
            count: 1,
            interval_seconds: 0.0,
            width: 1392, // ICX825AL
            height: 1040,
            bits_per_pixel: 16,
            binning: Binning::None,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Returns the pause between captures.
    ///
    /// Fails with [`ConfigError::InvalidInterval`] for values a
    /// [`Duration`] cannot hold.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.interval_seconds)
            .map_err(|_| ConfigError::InvalidInterval)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if !(self.exposure_seconds >= 0.0 && self.exposure_seconds.is_finite()) {
            return Err(ConfigError::InvalidExposure);
        }
        self.interval()?;
        if self.count == 0 {
            return Err(ConfigError::InvalidCount);
        }
        if self.bits_per_pixel == 0 || self.bits_per_pixel > MAX_BITS_PER_PIXEL {
            return Err(ConfigError::InvalidBitDepth(self.bits_per_pixel));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid exposure time (must be a non-negative number of seconds)")]
    InvalidExposure,
    #[error("invalid capture interval (must be a non-negative number of seconds)")]
    InvalidInterval,
    #[error("capture count must be at least 1")]
    InvalidCount,
    #[error("unsupported bit depth {0} (must be 1-16)")]
    InvalidBitDepth(u8),
    #[error("invalid JPEG quality {0} (must be 1-100)")]
    InvalidQuality(u8),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Where and how processed frames are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `<epoch>.jpg` / `<epoch>.fits`.
    pub directory: PathBuf,
    /// Quality passed through to the JPEG encoder.
    pub jpeg_quality: u8,
    /// Apply the min/max contrast stretch to the preview raster.
    pub stretch: bool,
    /// Also write a PGM copy of the preview raster.
    pub write_pgm: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("images"),
            jpeg_quality: 90,
            stretch: true,
            write_pgm: false,
        }
    }
}

impl OutputConfig {
    /// Validates the output parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        Ok(())
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub archive: ArchivalMetadata,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.capture.validate()?;
        config.output.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert!(OutputConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_negative_exposure_invalid() {
        let mut config = CaptureConfig::default();
        config.exposure_seconds = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExposure)));

        config.exposure_seconds = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidExposure)));
    }

    #[test]
    fn test_quality_bounds() {
        let mut output = OutputConfig::default();
        output.jpeg_quality = 0;
        assert!(matches!(output.validate(), Err(ConfigError::InvalidQuality(0))));
        output.jpeg_quality = 100;
        assert!(output.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config.capture.count, 1);
        assert_eq!(config.output.jpeg_quality, 90);
        assert!(config.output.stretch);
        assert_eq!(config.archive.instrument_name, "Unknown");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            [capture]
            exposure_seconds = 1.5
            count = 3
            binning = "2x2"

            [output]
            directory = "/tmp/frames"
            stretch = false

            [archive]
            instrument_name = "SX ECHO2"
            detector_name = "ICX825AL"
        "#;
        let config = FileConfig::from_toml(toml).unwrap();
        assert_eq!(config.capture.exposure_seconds, 1.5);
        assert_eq!(config.capture.count, 3);
        assert_eq!(config.capture.binning, Binning::TwoByTwo);
        assert_eq!(config.capture.width, 1392);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/frames"));
        assert!(!config.output.stretch);
        assert_eq!(config.archive.instrument_name, "SX ECHO2");
        assert_eq!(config.archive.object_name, "Unknown");
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = FileConfig::from_toml("[capture]\ncount = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidCount)));

        let result = FileConfig::from_toml("[capture\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_sample_config_parses() {
        let config = FileConfig::from_toml(include_str!("../../sx-capture.toml")).unwrap();
        assert!(config.capture.validate().is_ok());
        assert!(config.output.validate().is_ok());
        assert_eq!(config.archive.instrument_name, "SX ECHO2");
    }

    #[test]
    fn test_interval_must_fit_duration() {
        let config = FileConfig::from_toml("[capture]\ninterval_seconds = 1e30\ncount = 2\n")
            .unwrap()
            .capture;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInterval)));
        assert!(matches!(config.interval(), Err(ConfigError::InvalidInterval)));

        let config = CaptureConfig {
            interval_seconds: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInterval)));

        let config = CaptureConfig {
            interval_seconds: 2.5,
            ..Default::default()
        };
        assert_eq!(config.interval().unwrap(), Duration::from_millis(2500));
    }
}
