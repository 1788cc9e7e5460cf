//! Descriptive fields written into the archive header.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const UNKNOWN: &str = "Unknown";

/// Descriptive header fields, each independently optional.
///
/// Free-text fields default to `"Unknown"`. Pixel size defaults to the
/// ICX825AL's 6.45 microns. Binning and observation time default to the
/// values carried by the frame itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchivalMetadata {
    /// `INSTRUME`: camera model.
    pub instrument_name: String,
    /// `DETECTOR`: sensor part number.
    pub detector_name: String,
    /// `XPIXSZ`: unbinned pixel pitch along X in microns.
    pub pixel_size_microns_x: f64,
    /// `YPIXSZ`: unbinned pixel pitch along Y in microns.
    pub pixel_size_microns_y: f64,
    /// `XBINNING`/`YBINNING`; taken from the frame when unset.
    pub binning_factor: Option<u32>,
    /// `DATE-OBS`; taken from the frame's capture time when unset.
    pub observation_timestamp: Option<DateTime<Utc>>,
    /// `SOFTWARE`.
    pub software_name: String,
    /// `OBJECT`.
    pub object_name: String,
    /// `OBSERVER`.
    pub observer_name: String,
    /// `TELESCOP`.
    pub telescope_name: String,
}

impl Default for ArchivalMetadata {
    fn default() -> Self {
        Self {
            instrument_name: UNKNOWN.to_string(),
            detector_name: UNKNOWN.to_string(),
            pixel_size_microns_x: 6.45,
            pixel_size_microns_y: 6.45,
            binning_factor: None,
            observation_timestamp: None,
            software_name: UNKNOWN.to_string(),
            object_name: UNKNOWN.to_string(),
            observer_name: UNKNOWN.to_string(),
            telescope_name: UNKNOWN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let meta = ArchivalMetadata::default();
        assert_eq!(meta.instrument_name, "Unknown");
        assert_eq!(meta.telescope_name, "Unknown");
        assert_eq!(meta.pixel_size_microns_x, 6.45);
        assert!(meta.binning_factor.is_none());
        assert!(meta.observation_timestamp.is_none());
    }

    #[test]
    fn test_timestamp_from_toml() {
        let meta: ArchivalMetadata = toml::from_str(
            r#"
            observation_timestamp = "2024-03-01T21:15:07Z"
            binning_factor = 2
            "#,
        )
        .unwrap();

        let ts = meta.observation_timestamp.unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T21:15:07+00:00");
        assert_eq!(meta.binning_factor, Some(2));
        assert_eq!(meta.object_name, "Unknown");
    }
}
