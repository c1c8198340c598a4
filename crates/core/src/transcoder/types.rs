//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::error::TranscodeError;

/// A time range, in seconds, to keep from a fetched artifact.
///
/// Zero is a valid bound: `SliceBounds::new(0.0, 5.0)` keeps the first five
/// seconds. Absence of a slice is expressed with `Option<SliceBounds>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceBounds {
    /// Start offset in seconds.
    pub start_secs: f64,
    /// End offset in seconds.
    pub end_secs: f64,
}

impl SliceBounds {
    /// Creates bounds, rejecting negative, non-finite or empty ranges.
    pub fn new(start_secs: f64, end_secs: f64) -> Result<Self, TranscodeError> {
        if !start_secs.is_finite() || !end_secs.is_finite() {
            return Err(TranscodeError::invalid_slice("bounds must be finite"));
        }
        if start_secs < 0.0 {
            return Err(TranscodeError::invalid_slice(format!(
                "start {} is negative",
                start_secs
            )));
        }
        if end_secs <= start_secs {
            return Err(TranscodeError::invalid_slice(format!(
                "end {} is not after start {}",
                end_secs, start_secs
            )));
        }
        Ok(Self {
            start_secs,
            end_secs,
        })
    }

    /// Interprets bounds coming from legacy metadata, where a missing or zero
    /// start or end means "no slice".
    pub fn from_legacy(
        start_secs: Option<f64>,
        end_secs: Option<f64>,
    ) -> Result<Option<Self>, TranscodeError> {
        match (start_secs, end_secs) {
            (Some(start), Some(end)) if start != 0.0 && end != 0.0 => {
                Self::new(start, end).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Length of the range in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

impl fmt::Display for SliceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_secs, self.end_secs)
    }
}

/// Result of a successful remux or trim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeResult {
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Run duration in milliseconds.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_start_is_valid() {
        let bounds = SliceBounds::new(0.0, 5.0).unwrap();
        assert_eq!(bounds.start_secs, 0.0);
        assert_eq!(bounds.duration_secs(), 5.0);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(SliceBounds::new(10.0, 10.0).is_err());
        assert!(SliceBounds::new(10.0, 5.0).is_err());
        assert!(SliceBounds::new(-1.0, 5.0).is_err());
        assert!(SliceBounds::new(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_legacy_zero_means_no_slice() {
        assert_eq!(SliceBounds::from_legacy(Some(0.0), Some(10.0)).unwrap(), None);
        assert_eq!(SliceBounds::from_legacy(Some(3.0), Some(0.0)).unwrap(), None);
        assert_eq!(SliceBounds::from_legacy(None, Some(10.0)).unwrap(), None);
        assert_eq!(
            SliceBounds::from_legacy(Some(3.0), Some(10.0)).unwrap(),
            Some(SliceBounds {
                start_secs: 3.0,
                end_secs: 10.0
            })
        );
        assert!(SliceBounds::from_legacy(Some(10.0), Some(3.0)).is_err());
    }

    #[test]
    fn test_display() {
        let bounds = SliceBounds::new(1.5, 12.0).unwrap();
        assert_eq!(bounds.to_string(), "1.5-12");
    }
}
