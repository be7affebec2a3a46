//! Timeline Model Definitions
//!
//! Defines Source, Track, Clip and Effect types for timeline management.
//! Clips reference their track and source by id; effects are owned by clips.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    new_id, ClipId, EffectId, MediaType, SourceId, TimeSec, TrackId,
};

// =============================================================================
// Source
// =============================================================================

/// Reference to a raw media asset (file path or URL)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Origin locator (path or URL); never resolved by the engine
    pub url: String,
    /// Duration in seconds, 0 when unknown (images)
    pub duration: TimeSec,
    /// Pixel width, 0 for audio
    pub width: u32,
    /// Pixel height, 0 for audio
    pub height: u32,
}

impl Source {
    /// Creates a new source with a generated id
    pub fn new(name: &str, media_type: MediaType, url: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            media_type,
            url: url.to_string(),
            duration: 0.0,
            width: 0,
            height: 0,
        }
    }

    /// Sets the source duration
    pub fn with_duration(mut self, duration: TimeSec) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the pixel dimensions
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Returns true when the source has a known, bounded duration
    pub fn has_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }
}

// =============================================================================
// Track
// =============================================================================

/// Track type/kind enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Track kind that naturally hosts the given media type
    pub fn for_media(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Audio => TrackKind::Audio,
            MediaType::Video | MediaType::Image => TrackKind::Video,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Video => write!(f, "video"),
            TrackKind::Audio => write!(f, "audio"),
        }
    }
}

impl std::str::FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(TrackKind::Video),
            "audio" => Ok(TrackKind::Audio),
            other => Err(format!("Unknown track type: {}", other)),
        }
    }
}

/// Ordered lane holding clips of one media kind
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub name: String,
    /// Lane order, unique per track kind
    pub order: u32,
    pub muted: bool,
    pub locked: bool,
    pub visible: bool,
}

impl Track {
    /// Creates a new track with the given name, kind and lane order
    pub fn new(name: &str, kind: TrackKind, order: u32) -> Self {
        Self {
            id: new_id(),
            kind,
            name: name.to_string(),
            order,
            muted: false,
            locked: false,
            visible: true,
        }
    }

    /// Returns true if this is a video track
    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }

    /// Returns true if this is an audio track
    pub fn is_audio(&self) -> bool {
        self.kind == TrackKind::Audio
    }
}

// =============================================================================
// Effects
// =============================================================================

/// Named effect presets. Unrecognized names are preserved verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EffectType {
    FadeIn,
    FadeOut,
    Blur,
    Brightness,
    Contrast,
    Saturation,
    Speed,
    Volume,
    Other(String),
}

impl EffectType {
    /// Canonical camelCase name used in documents and commands
    pub fn as_str(&self) -> &str {
        match self {
            EffectType::FadeIn => "fadeIn",
            EffectType::FadeOut => "fadeOut",
            EffectType::Blur => "blur",
            EffectType::Brightness => "brightness",
            EffectType::Contrast => "contrast",
            EffectType::Saturation => "saturation",
            EffectType::Speed => "speed",
            EffectType::Volume => "volume",
            EffectType::Other(name) => name,
        }
    }

    /// Returns true for presets this build knows how to validate
    pub fn is_known(&self) -> bool {
        !matches!(self, EffectType::Other(_))
    }

    /// Numeric parameter each preset expects, with its inclusive bounds
    pub fn numeric_param(&self) -> Option<(&'static str, f64, f64)> {
        match self {
            EffectType::Blur => Some(("radius", 0.0, 100.0)),
            EffectType::Brightness => Some(("value", -1.0, 1.0)),
            EffectType::Contrast => Some(("value", 0.0, 4.0)),
            EffectType::Saturation => Some(("value", 0.0, 4.0)),
            EffectType::Speed => Some(("rate", 0.1, 10.0)),
            EffectType::Volume => Some(("level", 0.0, 4.0)),
            EffectType::FadeIn | EffectType::FadeOut | EffectType::Other(_) => None,
        }
    }

    /// Validates params against the preset's expectations
    pub fn validate_params(&self, params: &EffectParams) -> Result<(), String> {
        let Some((key, min, max)) = self.numeric_param() else {
            return Ok(());
        };
        match params.get(key) {
            None => Ok(()),
            Some(ParamValue::Number(v)) if v.is_finite() && *v >= min && *v <= max => Ok(()),
            Some(ParamValue::Number(v)) => Err(format!(
                "{} '{}' must be within {}..={}, got {}",
                self, key, min, max, v
            )),
            Some(other) => Err(format!(
                "{} '{}' must be a number, got {}",
                self, key, other
            )),
        }
    }
}

impl From<String> for EffectType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fadeIn" | "fade-in" | "fade_in" => EffectType::FadeIn,
            "fadeOut" | "fade-out" | "fade_out" => EffectType::FadeOut,
            "blur" => EffectType::Blur,
            "brightness" => EffectType::Brightness,
            "contrast" => EffectType::Contrast,
            "saturation" => EffectType::Saturation,
            "speed" => EffectType::Speed,
            "volume" => EffectType::Volume,
            _ => EffectType::Other(value),
        }
    }
}

impl From<&str> for EffectType {
    fn from(value: &str) -> Self {
        EffectType::from(value.to_string())
    }
}

impl From<EffectType> for String {
    fn from(value: EffectType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effect parameter value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Parses a CLI-style literal (`true`, `1.5`, anything else as text)
    pub fn parse(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return ParamValue::Bool(b);
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => ParamValue::Number(n),
            _ => ParamValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Effect parameter mapping, ordered by key for stable output
pub type EffectParams = BTreeMap<String, ParamValue>;

/// Parameterized modifier attached to a clip's local time window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub id: EffectId,
    #[serde(rename = "type")]
    pub effect_type: EffectType,
    /// Offset within the clip (seconds)
    pub start_time: TimeSec,
    pub duration: TimeSec,
    #[serde(default)]
    pub params: EffectParams,
}

impl Effect {
    /// Creates a new effect with a generated id
    pub fn new(effect_type: EffectType, start_time: TimeSec, duration: TimeSec) -> Self {
        Self {
            id: new_id(),
            effect_type,
            start_time,
            duration,
            params: EffectParams::new(),
        }
    }

    /// Adds a parameter
    pub fn with_param(mut self, key: &str, value: ParamValue) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }

    /// Returns the end offset within the clip
    pub fn end_time(&self) -> TimeSec {
        self.start_time + self.duration
    }
}

// =============================================================================
// Clip
// =============================================================================

/// Timed placement of a trimmed window of a source onto a track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    pub source_id: SourceId,
    pub track_id: TrackId,
    /// Position on the timeline (seconds)
    pub start_time: TimeSec,
    pub duration: TimeSec,
    /// In-point within the source (seconds)
    pub source_start_offset: TimeSec,
    /// Out-point within the source (seconds)
    pub source_end_offset: TimeSec,
    /// Applied in order
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Clip {
    /// Creates a clip covering `source_start..source_end` placed at `start_time`
    pub fn new(
        source_id: &str,
        track_id: &str,
        start_time: TimeSec,
        source_start: TimeSec,
        source_end: TimeSec,
    ) -> Self {
        Self {
            id: new_id(),
            source_id: source_id.to_string(),
            track_id: track_id.to_string(),
            start_time,
            duration: source_end - source_start,
            source_start_offset: source_start,
            source_end_offset: source_end,
            effects: vec![],
        }
    }

    /// Returns the timeline end position
    pub fn end_time(&self) -> TimeSec {
        self.start_time + self.duration
    }

    /// Checks if a timeline time lies strictly inside the clip
    pub fn contains_strictly(&self, time_sec: TimeSec) -> bool {
        time_sec > self.start_time && time_sec < self.end_time()
    }

    /// Converts a timeline time to source time
    pub fn timeline_to_source(&self, timeline_sec: TimeSec) -> TimeSec {
        self.source_start_offset + (timeline_sec - self.start_time)
    }

    /// Gets an effect by ID
    pub fn get_effect(&self, effect_id: &str) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == effect_id)
    }
}

// =============================================================================
// Creation Specs
// =============================================================================

/// Input for adding a source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    #[serde(default)]
    pub duration: TimeSec,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl SourceSpec {
    pub fn new(name: &str, media_type: MediaType, url: &str) -> Self {
        Self {
            name: name.to_string(),
            media_type,
            url: url.to_string(),
            duration: 0.0,
            width: 0,
            height: 0,
        }
    }

    pub fn with_duration(mut self, duration: TimeSec) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Input for adding a track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSpec {
    #[serde(rename = "type")]
    pub kind: TrackKind,
    pub name: Option<String>,
    pub order: Option<u32>,
}

impl TrackSpec {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            name: None,
            order: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn at_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }
}

/// Input for adding a clip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSpec {
    pub source_id: SourceId,
    pub track_id: TrackId,
    pub start_time: TimeSec,
    /// Defaults to the rest of the source after the start offset
    pub duration: Option<TimeSec>,
    /// Defaults to 0
    pub source_start_offset: Option<TimeSec>,
}

impl ClipSpec {
    pub fn new(source_id: &str, track_id: &str, start_time: TimeSec) -> Self {
        Self {
            source_id: source_id.to_string(),
            track_id: track_id.to_string(),
            start_time,
            duration: None,
            source_start_offset: None,
        }
    }

    pub fn with_duration(mut self, duration: TimeSec) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_offset(mut self, offset: TimeSec) -> Self {
        self.source_start_offset = Some(offset);
        self
    }
}

/// Input for adding an effect
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSpec {
    #[serde(rename = "type")]
    pub effect_type: EffectType,
    /// Defaults to 0
    pub start_time: Option<TimeSec>,
    /// Defaults to the clip duration
    pub duration: Option<TimeSec>,
    #[serde(default)]
    pub params: EffectParams,
}

impl EffectSpec {
    pub fn new(effect_type: EffectType) -> Self {
        Self {
            effect_type,
            start_time: None,
            duration: None,
            params: EffectParams::new(),
        }
    }

    pub fn window(mut self, start_time: TimeSec, duration: TimeSec) -> Self {
        self.start_time = Some(start_time);
        self.duration = Some(duration);
        self
    }

    pub fn with_param(mut self, key: &str, value: ParamValue) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_creation() {
        let video = Track::new("Video 1", TrackKind::Video, 0);
        let audio = Track::new("Audio 1", TrackKind::Audio, 0);

        assert!(video.is_video());
        assert!(audio.is_audio());
        assert!(video.visible);
        assert!(!video.muted);
        assert!(!video.locked);
        assert_ne!(video.id, audio.id);
    }

    #[test]
    fn test_track_serializes_type_field() {
        let track = Track::new("A1", TrackKind::Audio, 2);
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["type"], "audio");
        assert_eq!(json["order"], 2);
    }

    #[test]
    fn test_clip_window() {
        let clip = Clip::new("src", "trk", 5.0, 2.0, 8.0);

        assert_eq!(clip.duration, 6.0);
        assert_eq!(clip.end_time(), 11.0);
        assert!(clip.contains_strictly(6.0));
        assert!(!clip.contains_strictly(5.0));
        assert!(!clip.contains_strictly(11.0));
        assert_eq!(clip.timeline_to_source(7.0), 4.0);
    }

    #[test]
    fn test_clip_field_names() {
        let clip = Clip::new("src", "trk", 1.0, 0.0, 3.0);
        let json = serde_json::to_value(&clip).unwrap();

        for key in [
            "sourceId",
            "trackId",
            "startTime",
            "duration",
            "sourceStartOffset",
            "sourceEndOffset",
            "effects",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_effect_type_names() {
        assert_eq!(EffectType::from("fadeIn"), EffectType::FadeIn);
        assert_eq!(EffectType::from("fade-out"), EffectType::FadeOut);
        assert_eq!(
            EffectType::from("glitch"),
            EffectType::Other("glitch".to_string())
        );
        assert_eq!(EffectType::FadeOut.to_string(), "fadeOut");

        let json = serde_json::to_string(&EffectType::Other("vhs".into())).unwrap();
        assert_eq!(json, "\"vhs\"");
    }

    #[test]
    fn test_effect_params_validation() {
        let ok = EffectParams::from([("radius".to_string(), ParamValue::Number(5.0))]);
        assert!(EffectType::Blur.validate_params(&ok).is_ok());

        let too_big = EffectParams::from([("radius".to_string(), ParamValue::Number(500.0))]);
        assert!(EffectType::Blur.validate_params(&too_big).is_err());

        let wrong_type =
            EffectParams::from([("level".to_string(), ParamValue::Text("loud".into()))]);
        assert!(EffectType::Volume.validate_params(&wrong_type).is_err());

        // Unknown presets pass through unchecked
        assert!(EffectType::Other("x".into())
            .validate_params(&wrong_type)
            .is_ok());
    }

    #[test]
    fn test_param_value_parse() {
        assert_eq!(ParamValue::parse("true"), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse("2.5"), ParamValue::Number(2.5));
        assert_eq!(ParamValue::parse("warm"), ParamValue::Text("warm".into()));
    }

    #[test]
    fn test_effect_serialization() {
        let effect = Effect::new(EffectType::Blur, 0.5, 2.0)
            .with_param("radius", ParamValue::Number(4.0));

        let json = serde_json::to_string(&effect).unwrap();
        let parsed: Effect = serde_json::from_str(&json).unwrap();

        assert_eq!(effect, parsed);
        assert!(json.contains("\"type\":\"blur\""));
    }
}
