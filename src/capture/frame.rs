//! Raw sensor frame as delivered by a camera driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported sample depth; samples are stored as `u16`.
pub const MAX_BITS_PER_PIXEL: u8 = 16;

/// Errors raised when a frame cannot be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Declared dimensions disagree with the sample buffer.
    #[error("invalid frame: {width}x{height} declared but {actual} samples present")]
    InvalidFrame {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Actual sample count.
        actual: usize,
    },
    /// Sample depth outside 1..=16 bits.
    #[error("unsupported bit depth: {0} bits per pixel")]
    UnsupportedBitDepth(u8),
}

/// Sensor pixel combination used for a capture.
///
/// Informational only; it never changes the encoding math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binning {
    /// Full resolution.
    #[default]
    None,
    /// 2x2 on-chip binning.
    #[serde(rename = "2x2")]
    TwoByTwo,
}

impl Binning {
    /// Pixels combined along each axis.
    pub fn factor(self) -> u32 {
        match self {
            Binning::None => 1,
            Binning::TwoByTwo => 2,
        }
    }
}

/// One unprocessed exposure.
///
/// Samples are row-major: row 0 first, left to right within a row.
/// A frame is never mutated after construction.
#[derive(Clone)]
pub struct RawFrame {
    width: u32,
    height: u32,
    bits_per_pixel: u8,
    samples: Vec<u16>,
    binning: Binning,
    exposure_seconds: f64,
    captured_at: DateTime<Utc>,
}

impl RawFrame {
    /// Creates a frame stamped with the current time.
    ///
    /// No validation happens here; see [`RawFrame::validate`].
    pub fn new(width: u32, height: u32, bits_per_pixel: u8, samples: Vec<u16>) -> Self {
        Self {
            width,
            height,
            bits_per_pixel,
            samples,
            binning: Binning::None,
            exposure_seconds: 0.0,
            captured_at: Utc::now(),
        }
    }

    /// Sets the binning tag.
    pub fn with_binning(mut self, binning: Binning) -> Self {
        self.binning = binning;
        self
    }

    /// Sets the integration time. Negative values are stored as zero.
    pub fn with_exposure(mut self, seconds: f64) -> Self {
        self.exposure_seconds = seconds.max(0.0);
        self
    }

    /// Overrides the capture timestamp.
    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the effective sample depth.
    #[inline]
    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Returns the row-major sample buffer.
    #[inline]
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Returns the binning tag.
    #[inline]
    pub fn binning(&self) -> Binning {
        self.binning
    }

    /// Integration time in seconds.
    #[inline]
    pub fn exposure_seconds(&self) -> f64 {
        self.exposure_seconds
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Returns width * height.
    #[inline]
    pub fn sample_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns `2^bits_per_pixel - 1`, or an error for unusable depths.
    pub fn max_value_of_bit_depth(&self) -> Result<u32, FrameError> {
        match self.bits_per_pixel {
            1..=MAX_BITS_PER_PIXEL => Ok((1u32 << self.bits_per_pixel) - 1),
            other => Err(FrameError::UnsupportedBitDepth(other)),
        }
    }

    /// Checks dimensions against the buffer and the bit depth.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 || self.samples.len() != self.sample_count() {
            return Err(FrameError::InvalidFrame {
                width: self.width,
                height: self.height,
                actual: self.samples.len(),
            });
        }
        self.max_value_of_bit_depth()?;
        Ok(())
    }

    /// Returns true if [`RawFrame::validate`] would succeed.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bits_per_pixel", &self.bits_per_pixel)
            .field("binning", &self.binning)
            .field("exposure_seconds", &self.exposure_seconds)
            .field("samples", &self.samples.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = RawFrame::new(4, 3, 16, vec![0u16; 12])
            .with_binning(Binning::TwoByTwo)
            .with_exposure(2.5);

        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.sample_count(), 12);
        assert_eq!(frame.binning().factor(), 2);
        assert_eq!(frame.exposure_seconds(), 2.5);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let frame = RawFrame::new(640, 480, 16, vec![0u16; 100]);
        assert_eq!(
            frame.validate(),
            Err(FrameError::InvalidFrame {
                width: 640,
                height: 480,
                actual: 100
            })
        );
    }

    #[test]
    fn test_zero_dimension_invalid() {
        let frame = RawFrame::new(0, 10, 16, Vec::new());
        assert!(matches!(
            frame.validate(),
            Err(FrameError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn test_bit_depth_bounds() {
        let frame = RawFrame::new(1, 1, 0, vec![0]);
        assert_eq!(frame.validate(), Err(FrameError::UnsupportedBitDepth(0)));

        let frame = RawFrame::new(1, 1, 17, vec![0]);
        assert_eq!(frame.validate(), Err(FrameError::UnsupportedBitDepth(17)));

        let frame = RawFrame::new(1, 1, 8, vec![0]);
        assert_eq!(frame.max_value_of_bit_depth(), Ok(255));

        let frame = RawFrame::new(1, 1, 16, vec![0]);
        assert_eq!(frame.max_value_of_bit_depth(), Ok(65535));
    }

    #[test]
    fn test_negative_exposure_clamped() {
        let frame = RawFrame::new(1, 1, 16, vec![0]).with_exposure(-1.0);
        assert_eq!(frame.exposure_seconds(), 0.0);
    }
}
