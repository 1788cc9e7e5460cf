//! Binary PGM (P5) preview output.

use super::{write_atomic, ExportError};
use crate::normalize::NormalizedRaster;
use std::path::Path;

/// Serializes a raster as an 8-bit binary PGM.
pub fn encode_pgm(raster: &NormalizedRaster) -> Vec<u8> {
    let header = format!("P5\n{} {}\n255\n", raster.width(), raster.height());
    let mut bytes = Vec::with_capacity(header.len() + raster.samples().len());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(raster.samples());
    bytes
}

/// Writes a raster atomically as PGM.
pub fn write_pgm(raster: &NormalizedRaster, path: &Path) -> Result<(), ExportError> {
    write_atomic(path, &encode_pgm(raster))
}
