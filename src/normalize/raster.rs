//! 8-bit preview raster.

use super::FrameStatistics;

/// Single-channel 8-bit raster derived from a raw frame.
///
/// Same dimensions as its source, row-major. Also carries the statistics
/// gathered while producing it.
#[derive(Clone, PartialEq, Eq)]
pub struct NormalizedRaster {
    width: u32,
    height: u32,
    samples: Vec<u8>,
    statistics: FrameStatistics,
}

impl NormalizedRaster {
    pub(crate) fn new(
        width: u32,
        height: u32,
        samples: Vec<u8>,
        statistics: FrameStatistics,
    ) -> Self {
        debug_assert_eq!(samples.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            samples,
            statistics,
        }
    }

    /// Returns the raster width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the raster height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the row-major bytes.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Consumes the raster, returning its bytes.
    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Extremes of the source frame.
    #[inline]
    pub fn statistics(&self) -> FrameStatistics {
        self.statistics
    }
}

impl std::fmt::Debug for NormalizedRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedRaster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("statistics", &self.statistics)
            .field("pixel_bytes", &self.samples.len())
            .finish()
    }
}
