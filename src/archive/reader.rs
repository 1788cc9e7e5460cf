//! Decoding of archive containers written by [`super::encode`].

use super::card::{CardValue, HeaderCard, CARD_LEN};
use super::encoder::{block_aligned, BITPIX_FLOAT32, BLOCK_SIZE};
use super::ArchiveError;

/// A decoded container.
#[derive(Debug, Clone)]
pub struct ParsedContainer {
    /// Header cards up to and including `END`.
    pub cards: Vec<HeaderCard>,
    /// `NAXIS1`.
    pub width: u32,
    /// `NAXIS2`.
    pub height: u32,
    /// Padded header length in bytes.
    pub header_len: usize,
    /// Row-major pixel values.
    pub pixels: Vec<f32>,
}

impl ParsedContainer {
    /// Looks up the first card with the given keyword.
    pub fn card(&self, keyword: &str) -> Option<&HeaderCard> {
        self.cards.iter().find(|c| c.keyword() == keyword)
    }

    /// Looks up a card's value.
    pub fn value(&self, keyword: &str) -> Option<&CardValue> {
        self.card(keyword).and_then(HeaderCard::value)
    }
}

/// Parses a complete container.
///
/// Requires block alignment, an `END` card, `BITPIX = -32` and a
/// two-axis image whose pixels fit in the data section.
pub fn read_container(bytes: &[u8]) -> Result<ParsedContainer, ArchiveError> {
    if bytes.len() % BLOCK_SIZE != 0 {
        return Err(ArchiveError::NotBlockAligned(bytes.len()));
    }

    let mut cards = Vec::new();
    for (index, record) in bytes.chunks_exact(CARD_LEN).enumerate() {
        let card = HeaderCard::parse(record, index)?;
        let done = card.is_end();
        cards.push(card);
        if done {
            break;
        }
    }
    if !cards.last().is_some_and(HeaderCard::is_end) {
        return Err(ArchiveError::MissingEnd);
    }
    let header_len = block_aligned(cards.len() * CARD_LEN);

    let integer = |keyword: &'static str| -> Result<i64, ArchiveError> {
        cards
            .iter()
            .find(|c| c.keyword() == keyword)
            .and_then(HeaderCard::value)
            .and_then(CardValue::as_integer)
            .ok_or(ArchiveError::MissingKeyword(keyword))
    };

    let bitpix = integer("BITPIX")?;
    if bitpix != BITPIX_FLOAT32 {
        return Err(ArchiveError::UnsupportedBitpix(bitpix));
    }
    let naxis = integer("NAXIS")?;
    if naxis != 2 {
        return Err(ArchiveError::UnsupportedAxes(naxis));
    }
    let width = axis_length(integer("NAXIS1")?)?;
    let height = axis_length(integer("NAXIS2")?)?;

    let data = &bytes[header_len..];
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(ArchiveError::InvalidAxisLength(i64::from(height)))?;
    if data.len() < expected {
        return Err(ArchiveError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let pixels = data[..expected]
        .chunks_exact(4)
        .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(ParsedContainer {
        cards,
        width,
        height,
        header_len,
        pixels,
    })
}

fn axis_length(value: i64) -> Result<u32, ArchiveError> {
    u32::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or(ArchiveError::InvalidAxisLength(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{encode, ArchivalMetadata};
    use crate::capture::RawFrame;
    use crate::normalize::FrameStatistics;

    fn encoded(frame: &RawFrame) -> Vec<u8> {
        let stats = FrameStatistics::compute(frame).unwrap();
        encode(frame, &stats, &ArchivalMetadata::default())
            .unwrap()
            .into_bytes()
    }

    #[test]
    fn test_reads_back_encoded_frame() {
        let frame = RawFrame::new(4, 3, 16, (0..12).map(|i| i * 5000).collect());
        let parsed = read_container(&encoded(&frame)).unwrap();

        assert_eq!(parsed.width, 4);
        assert_eq!(parsed.height, 3);
        assert_eq!(parsed.header_len, BLOCK_SIZE);
        assert_eq!(parsed.cards.len(), 20);
        assert_eq!(parsed.value("DATAMAX"), Some(&CardValue::Integer(55000)));
        assert_eq!(
            parsed.value("INSTRUME").and_then(CardValue::as_text),
            Some("Unknown")
        );
        assert_eq!(
            parsed.value("SIMPLE").and_then(CardValue::as_logical),
            Some(true)
        );

        let restored: Vec<u16> = parsed.pixels.iter().map(|&p| p as u16).collect();
        assert_eq!(restored, frame.samples());
    }

    #[test]
    fn test_rejects_unaligned() {
        let mut bytes = encoded(&RawFrame::new(1, 1, 16, vec![1]));
        bytes.pop();
        assert!(matches!(
            read_container(&bytes),
            Err(ArchiveError::NotBlockAligned(_))
        ));
    }

    #[test]
    fn test_rejects_missing_end() {
        let bytes = vec![b' '; BLOCK_SIZE];
        assert!(matches!(
            read_container(&bytes),
            Err(ArchiveError::MissingEnd)
        ));
    }

    #[test]
    fn test_rejects_truncated_data() {
        let bytes = encoded(&RawFrame::new(1, 1, 16, vec![1]));
        assert!(matches!(
            read_container(&bytes[..BLOCK_SIZE]),
            Err(ArchiveError::Truncated {
                expected: 4,
                actual: 0
            })
        ));
    }

    #[test]
    fn test_rejects_oversized_axes() {
        let mut bytes = Vec::new();
        for card in [
            HeaderCard::new("SIMPLE", CardValue::Logical(true), None),
            HeaderCard::new("BITPIX", CardValue::Integer(BITPIX_FLOAT32), None),
            HeaderCard::new("NAXIS", CardValue::Integer(2), None),
            HeaderCard::new("NAXIS1", CardValue::Integer(u32::MAX.into()), None),
            HeaderCard::new("NAXIS2", CardValue::Integer(u32::MAX.into()), None),
            HeaderCard::end(),
        ] {
            bytes.extend_from_slice(&card.render());
        }
        bytes.resize(2 * BLOCK_SIZE, b' ');

        let result = read_container(&bytes);
        assert!(matches!(
            result,
            Err(ArchiveError::InvalidAxisLength(_)) | Err(ArchiveError::Truncated { .. })
        ));
    }
}
