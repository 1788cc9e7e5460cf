//! Frame to archive container serialization.

use super::card::{CardValue, HeaderCard, CARD_LEN};
use super::ArchivalMetadata;
use crate::capture::{FrameError, RawFrame};
use crate::normalize::FrameStatistics;

/// Section alignment in bytes.
pub const BLOCK_SIZE: usize = 2880;

/// Pixels are always stored as 32-bit IEEE floats.
pub const BITPIX_FLOAT32: i64 = -32;

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A complete, block-aligned archive file image.
///
/// Header section followed by pixel section, both multiples of
/// [`BLOCK_SIZE`]. Never modified after [`encode`] returns it.
#[derive(Clone, PartialEq, Eq)]
pub struct ArchivalContainer {
    bytes: Vec<u8>,
    header_len: usize,
}

impl ArchivalContainer {
    /// Returns the whole container.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the container, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns the padded header section.
    pub fn header(&self) -> &[u8] {
        &self.bytes[..self.header_len]
    }

    /// Returns the padded pixel section.
    pub fn data(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a container produced by [`encode`].
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for ArchivalContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchivalContainer")
            .field("header_len", &self.header_len)
            .field("data_len", &(self.bytes.len() - self.header_len))
            .finish()
    }
}

/// Rounds `len` up to the next multiple of [`BLOCK_SIZE`].
#[inline]
pub fn block_aligned(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE
}

/// Builds the header cards in their fixed order, ending with `END`.
///
/// `DATAMAX`/`DATAMIN` come from `stats`, which must describe the
/// unclipped samples of `frame`.
pub fn header_cards(
    frame: &RawFrame,
    stats: &FrameStatistics,
    metadata: &ArchivalMetadata,
) -> Vec<HeaderCard> {
    use CardValue::{Integer, Logical, Real, Text};

    let binning = metadata
        .binning_factor
        .unwrap_or_else(|| frame.binning().factor()) as i64;
    let observed = metadata
        .observation_timestamp
        .unwrap_or_else(|| frame.captured_at())
        .format(DATE_FORMAT)
        .to_string();

    vec![
        HeaderCard::new("SIMPLE", Logical(true), Some("Standard FITS format")),
        HeaderCard::new("BITPIX", Integer(BITPIX_FLOAT32), Some("32-bit floating point")),
        HeaderCard::new("NAXIS", Integer(2), Some("Number of data axes")),
        HeaderCard::new("NAXIS1", Integer(frame.width() as i64), Some("Width in pixels")),
        HeaderCard::new("NAXIS2", Integer(frame.height() as i64), Some("Height in pixels")),
        HeaderCard::new(
            "EXPTIME",
            Real(frame.exposure_seconds()),
            Some("Exposure time in seconds"),
        ),
        HeaderCard::new(
            "INSTRUME",
            Text(metadata.instrument_name.clone()),
            Some("Camera model"),
        ),
        HeaderCard::new(
            "DETECTOR",
            Text(metadata.detector_name.clone()),
            Some("CCD sensor"),
        ),
        HeaderCard::new(
            "XPIXSZ",
            Real(metadata.pixel_size_microns_x),
            Some("Pixel size X (microns)"),
        ),
        HeaderCard::new(
            "YPIXSZ",
            Real(metadata.pixel_size_microns_y),
            Some("Pixel size Y (microns)"),
        ),
        HeaderCard::new("XBINNING", Integer(binning), Some("X binning factor")),
        HeaderCard::new("YBINNING", Integer(binning), Some("Y binning factor")),
        HeaderCard::new("DATE-OBS", Text(observed), Some("Observation date")),
        HeaderCard::new(
            "SOFTWARE",
            Text(metadata.software_name.clone()),
            Some("Software used"),
        ),
        HeaderCard::new(
            "DATAMAX",
            Integer(stats.max_value as i64),
            Some("Maximum pixel value"),
        ),
        HeaderCard::new(
            "DATAMIN",
            Integer(stats.min_value as i64),
            Some("Minimum pixel value"),
        ),
        HeaderCard::new("OBJECT", Text(metadata.object_name.clone()), Some("Target object")),
        HeaderCard::new(
            "OBSERVER",
            Text(metadata.observer_name.clone()),
            Some("Observer name"),
        ),
        HeaderCard::new(
            "TELESCOP",
            Text(metadata.telescope_name.clone()),
            Some("Telescope used"),
        ),
        HeaderCard::end(),
    ]
}

/// Serializes a frame into a block-aligned archive container.
///
/// Samples are converted to `f32` without scaling and written
/// big-endian in row-major order. The header is padded with spaces, the
/// pixel section with zeros. Performs no I/O.
pub fn encode(
    frame: &RawFrame,
    stats: &FrameStatistics,
    metadata: &ArchivalMetadata,
) -> Result<ArchivalContainer, FrameError> {
    frame.validate()?;

    let cards = header_cards(frame, stats, metadata);
    let header_len = block_aligned(cards.len() * CARD_LEN);
    let data_len = block_aligned(frame.sample_count() * 4);

    let mut bytes = Vec::with_capacity(header_len + data_len);
    for card in &cards {
        bytes.extend_from_slice(&card.render());
    }
    bytes.resize(header_len, b' ');

    for &sample in frame.samples() {
        bytes.extend_from_slice(&f32::from(sample).to_be_bytes());
    }
    bytes.resize(header_len + data_len, 0);

    tracing::debug!(
        width = frame.width(),
        height = frame.height(),
        header_len,
        data_len,
        "Encoded archive container"
    );

    Ok(ArchivalContainer { bytes, header_len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_frame() -> RawFrame {
        RawFrame::new(3, 2, 16, vec![0, 1, 2, 65535, 40000, 7])
            .with_exposure(2.5)
            .with_captured_at(chrono::Utc.with_ymd_and_hms(2024, 3, 1, 21, 15, 7).unwrap())
    }

    fn card_text(container: &ArchivalContainer, index: usize) -> &str {
        let start = index * CARD_LEN;
        std::str::from_utf8(&container.header()[start..start + CARD_LEN]).unwrap()
    }

    #[test]
    fn test_block_aligned() {
        assert_eq!(block_aligned(0), 0);
        assert_eq!(block_aligned(1), 2880);
        assert_eq!(block_aligned(2880), 2880);
        assert_eq!(block_aligned(2881), 5760);
    }

    #[test]
    fn test_card_order() {
        let frame = test_frame();
        let stats = FrameStatistics::compute(&frame).unwrap();
        let keywords: Vec<String> = header_cards(&frame, &stats, &ArchivalMetadata::default())
            .iter()
            .map(|c| c.keyword().to_string())
            .collect();

        assert_eq!(
            keywords,
            [
                "SIMPLE", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "EXPTIME", "INSTRUME",
                "DETECTOR", "XPIXSZ", "YPIXSZ", "XBINNING", "YBINNING", "DATE-OBS", "SOFTWARE",
                "DATAMAX", "DATAMIN", "OBJECT", "OBSERVER", "TELESCOP", "END",
            ]
        );
    }

    #[test]
    fn test_header_contents() {
        let frame = test_frame();
        let stats = FrameStatistics::compute(&frame).unwrap();
        let container = encode(&frame, &stats, &ArchivalMetadata::default()).unwrap();

        assert!(card_text(&container, 1).starts_with("BITPIX  =                  -32 / "));
        assert!(card_text(&container, 3).starts_with("NAXIS1  =                    3 / "));
        assert!(card_text(&container, 5).starts_with("EXPTIME =                  2.5 / "));
        assert!(card_text(&container, 12).starts_with("DATE-OBS= '2024-03-01T21:15:07' / "));
        assert!(card_text(&container, 14).starts_with("DATAMAX =                65535 / "));
        assert!(card_text(&container, 15).starts_with("DATAMIN =                    0 / "));
        assert_eq!(card_text(&container, 19), format!("END{}", " ".repeat(77)));

        // Padding after END is spaces.
        assert!(container.header()[20 * CARD_LEN..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_metadata_overrides() {
        let frame = test_frame().with_binning(crate::capture::Binning::TwoByTwo);
        let stats = FrameStatistics::compute(&frame).unwrap();

        let container = encode(&frame, &stats, &ArchivalMetadata::default()).unwrap();
        assert!(card_text(&container, 10).starts_with("XBINNING=                    2"));

        let metadata = ArchivalMetadata {
            binning_factor: Some(1),
            instrument_name: "SX ECHO2".into(),
            ..Default::default()
        };
        let container = encode(&frame, &stats, &metadata).unwrap();
        assert!(card_text(&container, 6).starts_with("INSTRUME=           'SX ECHO2'"));
        assert!(card_text(&container, 10).starts_with("XBINNING=                    1"));
        assert!(card_text(&container, 11).starts_with("YBINNING=                    1"));
    }

    #[test]
    fn test_pixel_section() {
        let frame = test_frame();
        let stats = FrameStatistics::compute(&frame).unwrap();
        let container = encode(&frame, &stats, &ArchivalMetadata::default()).unwrap();

        let data = container.data();
        assert_eq!(data.len(), BLOCK_SIZE);
        assert_eq!(&data[..4], &0.0f32.to_be_bytes());
        assert_eq!(&data[4..8], &[0x3f, 0x80, 0x00, 0x00]);
        assert_eq!(&data[12..16], &65535.0f32.to_be_bytes());
        assert!(data[24..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_invalid_frame_rejected() {
        let frame = RawFrame::new(3, 3, 16, vec![0; 8]);
        let stats = FrameStatistics {
            min_value: 0,
            max_value: 0,
        };
        assert!(matches!(
            encode(&frame, &stats, &ArchivalMetadata::default()),
            Err(FrameError::InvalidFrame { .. })
        ));
    }
}
