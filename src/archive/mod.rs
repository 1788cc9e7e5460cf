//! Bit-exact scientific archive (FITS) serialization.
//!
//! The container is a run of 80-byte ASCII header cards padded with
//! spaces to a 2880-byte boundary, followed by the raw samples as
//! big-endian 32-bit floats padded with zeros to a 2880-byte boundary.
//!
//! The archive is always built from the raw frame, never from the 8-bit
//! preview, so no precision is lost: every integer up to 2^24 is exact
//! in an `f32`.

mod card;
mod encoder;
mod metadata;
mod reader;

pub use card::{CardValue, HeaderCard, CARD_LEN};
pub use encoder::{
    block_aligned, encode, header_cards, ArchivalContainer, BITPIX_FLOAT32, BLOCK_SIZE,
};
pub use metadata::ArchivalMetadata;
pub use reader::{read_container, ParsedContainer};

use thiserror::Error;

/// Errors raised while decoding a container.
///
/// Encoding only fails on an invalid frame and reports [`FrameError`]
/// directly.
///
/// [`FrameError`]: crate::capture::FrameError
#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    /// Input length is not a whole number of blocks.
    #[error("container length {0} is not a multiple of {} bytes", BLOCK_SIZE)]
    NotBlockAligned(usize),
    /// No `END` card before the input ran out.
    #[error("header has no END card")]
    MissingEnd,
    /// A mandatory keyword is absent or not an integer.
    #[error("missing required keyword {0}")]
    MissingKeyword(&'static str),
    /// A card could not be parsed.
    #[error("malformed header card {index}: {reason}")]
    MalformedCard {
        /// Zero-based card position.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
    /// Pixel format other than 32-bit float.
    #[error("unsupported BITPIX {0} (only -32 is written)")]
    UnsupportedBitpix(i64),
    /// Anything but a two-axis image.
    #[error("unsupported NAXIS {0} (expected 2)")]
    UnsupportedAxes(i64),
    /// Axis length out of range, or a pixel count that overflows.
    #[error("invalid axis length {0}")]
    InvalidAxisLength(i64),
    /// The data section is shorter than the axes require.
    #[error("pixel section holds {actual} bytes, expected at least {expected}")]
    Truncated {
        /// Bytes the axes require.
        expected: usize,
        /// Bytes present after the header.
        actual: usize,
    },
}
