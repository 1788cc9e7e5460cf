//! Hand-off of the preview raster to the JPEG compressor.

use super::{write_atomic, ExportError};
use crate::normalize::NormalizedRaster;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use std::path::Path;

/// Quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Compresses a raster as single-channel JPEG.
///
/// `quality` is passed through to the encoder unchanged.
pub fn encode_jpeg(raster: &NormalizedRaster, quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.encode(
        raster.samples(),
        raster.width(),
        raster.height(),
        ExtendedColorType::L8,
    )?;
    Ok(buffer)
}

/// Compresses a raster and writes it atomically to `path`.
pub fn write_jpeg(raster: &NormalizedRaster, quality: u8, path: &Path) -> Result<(), ExportError> {
    let bytes = encode_jpeg(raster, quality)?;
    write_atomic(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::RawFrame;
    use crate::normalize::normalize;
    use image::GenericImageView;

    fn raster() -> NormalizedRaster {
        let frame = RawFrame::new(32, 16, 16, (0..512).map(|i| i * 100).collect());
        normalize(&frame, true).unwrap()
    }

    #[test]
    fn test_encode_jpeg_decodes_back() {
        let bytes = encode_jpeg(&raster(), DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (32, 16));
    }

    #[test]
    fn test_quality_changes_output() {
        let low = encode_jpeg(&raster(), 10).unwrap();
        let high = encode_jpeg(&raster(), 100).unwrap();
        assert_ne!(low, high);
    }

    #[test]
    fn test_write_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.jpg");
        write_jpeg(&raster(), 75, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
