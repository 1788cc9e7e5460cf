//! Raw frame to 8-bit raster conversion.
//!
//! Two policies exist:
//!
//! - **Stretch**: the observed minimum maps to 0 and the observed maximum
//!   to 255, linearly in between.
//! - **Fixed rescale**: each sample is divided by the bit-depth maximum
//!   (`2^bits - 1`) and scaled to 255.
//!
//! A flat frame always takes the fixed rescale path, even with stretch
//! enabled. It does not become mid-gray.

mod raster;
mod statistics;

pub use raster::NormalizedRaster;
pub use statistics::FrameStatistics;

use crate::capture::{FrameError, RawFrame};

/// Converts a raw frame to an 8-bit raster.
///
/// Scans the buffer once for its extremes, which are exposed through
/// [`NormalizedRaster::statistics`]. Pure and deterministic; fails only
/// when the frame itself is malformed.
pub fn normalize(frame: &RawFrame, stretch: bool) -> Result<NormalizedRaster, FrameError> {
    frame.validate()?;
    let depth_max = frame.max_value_of_bit_depth()? as f64;
    let stats = FrameStatistics::scan(frame.samples());

    let samples: Vec<u8> = if stretch && !stats.is_flat() {
        let min = stats.min_value as f64;
        let range = stats.range() as f64;
        tracing::trace!(min = stats.min_value, max = stats.max_value, "Stretching frame");
        frame
            .samples()
            .iter()
            .map(|&s| to_byte((s as f64 - min) / range * 255.0))
            .collect()
    } else {
        tracing::trace!(depth_max, flat = stats.is_flat(), "Rescaling frame by bit depth");
        frame
            .samples()
            .iter()
            .map(|&s| to_byte(s as f64 / depth_max * 255.0))
            .collect()
    };

    Ok(NormalizedRaster::new(
        frame.width(),
        frame.height(),
        samples,
        stats,
    ))
}

/// Rounds half away from zero and clamps to a byte.
#[inline]
fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
