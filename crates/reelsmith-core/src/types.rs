//! Reelsmith Core Type Definitions
//!
//! Defines fundamental types used throughout the project.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Source unique identifier (ULID)
pub type SourceId = String;

/// Clip unique identifier (ULID)
pub type ClipId = String;

/// Track unique identifier (ULID)
pub type TrackId = String;

/// Effect unique identifier (ULID)
pub type EffectId = String;

/// Operation unique identifier (ULID)
pub type OpId = String;

/// Generates a fresh ULID string.
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Returns true for finite, non-negative times.
pub fn is_valid_time_sec(value: TimeSec) -> bool {
    value.is_finite() && value >= 0.0
}

/// Returns true for finite, strictly positive durations.
pub fn is_valid_duration(value: TimeSec) -> bool {
    value.is_finite() && value > 0.0
}

// =============================================================================
// Media Type
// =============================================================================

/// Kind of raw media a source points at
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaType {
    Video,
    Audio,
    Image,
}

impl MediaType {
    /// Guesses the media type from a file extension, defaulting to video.
    pub fn from_locator(locator: &str) -> Self {
        let ext = locator
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp3" | "wav" | "aac" | "m4a" | "flac" | "ogg" | "opus" => MediaType::Audio,
            "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp" | "tif" | "tiff" => MediaType::Image,
            _ => MediaType::Video,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Video => write!(f, "video"),
            MediaType::Audio => write!(f, "audio"),
            MediaType::Image => write!(f, "image"),
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            "image" => Ok(MediaType::Image),
            other => Err(format!("Unknown media type: {}", other)),
        }
    }
}

// =============================================================================
// Aspect Ratio
// =============================================================================

/// Output aspect ratio of a project
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Vertical,
}

impl AspectRatio {
    /// Canvas size used when nothing else is known (1080 on the short edge)
    pub fn canvas(&self) -> (u32, u32) {
        match self {
            AspectRatio::Landscape => (1920, 1080),
            AspectRatio::Portrait => (1080, 1920),
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Vertical => (1080, 1350),
        }
    }

    /// Returns the ratio as a float (width / height)
    pub fn as_f64(&self) -> f64 {
        let (w, h) = self.canvas();
        w as f64 / h as f64
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::Landscape
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Square => "1:1",
            AspectRatio::Vertical => "4:5",
        };
        f.write_str(s)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(AspectRatio::Landscape),
            "9:16" => Ok(AspectRatio::Portrait),
            "1:1" => Ok(AspectRatio::Square),
            "4:5" => Ok(AspectRatio::Vertical),
            other => Err(format!(
                "Unsupported aspect ratio '{}', expected one of 16:9, 9:16, 1:1, 4:5",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_unique() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), 26);
        assert_ne!(a, b);
    }

    #[test]
    fn test_time_validation() {
        assert!(is_valid_time_sec(0.0));
        assert!(!is_valid_time_sec(-0.1));
        assert!(!is_valid_time_sec(f64::NAN));
        assert!(is_valid_duration(0.5));
        assert!(!is_valid_duration(0.0));
        assert!(!is_valid_duration(f64::INFINITY));
    }

    #[test]
    fn test_aspect_ratio_serialization() {
        let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
        assert_eq!(json, "\"9:16\"");

        let parsed: AspectRatio = serde_json::from_str("\"4:5\"").unwrap();
        assert_eq!(parsed, AspectRatio::Vertical);
    }

    #[test]
    fn test_aspect_ratio_from_str() {
        assert_eq!("1:1".parse::<AspectRatio>().unwrap(), AspectRatio::Square);
        assert!("21:9".parse::<AspectRatio>().is_err());
        assert!((AspectRatio::Landscape.as_f64() - 16.0 / 9.0).abs() < 0.001);
    }

    #[test]
    fn test_media_type_from_locator() {
        assert_eq!(MediaType::from_locator("voice.MP3"), MediaType::Audio);
        assert_eq!(MediaType::from_locator("/tmp/cover.png"), MediaType::Image);
        assert_eq!(MediaType::from_locator("https://cdn/x/clip.mp4"), MediaType::Video);
        assert_eq!("Audio".parse::<MediaType>().unwrap(), MediaType::Audio);
    }
}
