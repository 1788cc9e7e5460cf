//! Observed sample extremes of a raw frame.

use crate::capture::{FrameError, RawFrame};

/// True minimum and maximum of a frame's samples.
///
/// These are the unclipped extremes; both the preview stretch and the
/// archive header read them from here so the two never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatistics {
    /// Smallest sample value.
    pub min_value: u16,
    /// Largest sample value.
    pub max_value: u16,
}

impl FrameStatistics {
    /// Scans the frame once.
    pub fn compute(frame: &RawFrame) -> Result<Self, FrameError> {
        frame.validate()?;
        Ok(Self::scan(frame.samples()))
    }

    /// An empty buffer yields `0..=0`.
    pub(crate) fn scan(samples: &[u16]) -> Self {
        if samples.is_empty() {
            return Self {
                min_value: 0,
                max_value: 0,
            };
        }

        let (min_value, max_value) = samples
            .iter()
            .fold((u16::MAX, u16::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        Self {
            min_value,
            max_value,
        }
    }

    /// Returns `max_value - min_value`.
    #[inline]
    pub fn range(&self) -> u16 {
        self.max_value - self.min_value
    }

    /// Returns true if every sample has the same value.
    #[inline]
    pub fn is_flat(&self) -> bool {
        self.max_value == self.min_value
    }
}
