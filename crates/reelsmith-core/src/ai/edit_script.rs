//! Timeline Command Schema
//!
//! Defines the generic command shape produced by natural-language parsers,
//! suggestion engines and scripts, and the typed [`TimelineAction`] it is
//! parsed into before dispatch.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    timeline::{EffectSpec, TrackSpec},
    ClipId, CoreError, CoreResult, TimeSec, TrackId,
};

// =============================================================================
// TimelineCommand
// =============================================================================

/// A generic, serializable timeline instruction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineCommand {
    /// Action name (e.g. "trim", "split", "add-effect")
    pub action: String,
    /// Target clips, processed in order
    #[serde(default, alias = "targetClipIds")]
    pub clip_ids: Vec<ClipId>,
    /// Action-specific parameters
    #[serde(default)]
    pub params: Value,
    /// Human-readable summary shown in batch reports
    #[serde(default)]
    pub description: String,
}

impl TimelineCommand {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            clip_ids: vec![],
            params: Value::Object(Default::default()),
            description: String::new(),
        }
    }

    pub fn with_clip(mut self, clip_id: &str) -> Self {
        self.clip_ids.push(clip_id.to_string());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Label used in reports: the description, or the action name
    pub fn label(&self) -> &str {
        if self.description.is_empty() {
            &self.action
        } else {
            &self.description
        }
    }
}

/// A named batch of commands (`{ "commands": [...] }`)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandScript {
    /// What the user asked for
    #[serde(default)]
    pub intent: Option<String>,
    pub commands: Vec<TimelineCommand>,
}

// =============================================================================
// TimelineAction
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrimParams {
    #[serde(alias = "start", alias = "sourceStartOffset")]
    start_offset: Option<TimeSec>,
    #[serde(alias = "newDuration")]
    duration: Option<TimeSec>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitParams {
    #[serde(alias = "time", alias = "splitTime")]
    at: TimeSec,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartParams {
    #[serde(alias = "start", alias = "newStartTime")]
    start_time: Option<TimeSec>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveParams {
    #[serde(alias = "newTrackId")]
    track_id: Option<TrackId>,
    #[serde(alias = "start", alias = "newStartTime")]
    start_time: Option<TimeSec>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveEffectParams {
    effect_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeParams {
    #[serde(alias = "volume")]
    level: Option<f64>,
}

/// A command's action with its parameters validated
#[derive(Clone, Debug, PartialEq)]
pub enum TimelineAction {
    Trim {
        start_offset: Option<TimeSec>,
        duration: Option<TimeSec>,
    },
    RemoveClip,
    Split {
        at: TimeSec,
    },
    Duplicate {
        start_time: Option<TimeSec>,
    },
    Move {
        track_id: Option<TrackId>,
        start_time: Option<TimeSec>,
    },
    AddEffect(EffectSpec),
    AddTrack(TrackSpec),
    /// Accepted but not executable
    RemoveEffect {
        effect_id: Option<String>,
    },
    /// Accepted but not executable
    SetVolume {
        level: Option<f64>,
    },
    /// Forward-compatible passthrough for actions this build does not know
    Unknown {
        action: String,
        params: Value,
    },
}

fn parse_params<T: DeserializeOwned>(action: &str, params: &Value) -> CoreResult<T> {
    let params = match params {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(params)
        .map_err(|e| CoreError::InvalidCommand(format!("{}: {}", action, e)))
}

impl TimelineAction {
    /// Parses an action name and its loose params into a typed action
    pub fn parse(action: &str, params: &Value) -> CoreResult<Self> {
        let name = action.trim().to_ascii_lowercase().replace('_', "-");
        let parsed = match name.as_str() {
            "trim" => {
                let p: TrimParams = parse_params(action, params)?;
                if p.start_offset.is_none() && p.duration.is_none() {
                    return Err(CoreError::InvalidCommand(
                        "trim: expected startOffset and/or duration".to_string(),
                    ));
                }
                TimelineAction::Trim {
                    start_offset: p.start_offset,
                    duration: p.duration,
                }
            }
            "remove-clip" | "delete" | "delete-clip" => TimelineAction::RemoveClip,
            "split" => {
                let p: SplitParams = parse_params(action, params)?;
                TimelineAction::Split { at: p.at }
            }
            "duplicate" => {
                let p: StartParams = parse_params(action, params)?;
                TimelineAction::Duplicate {
                    start_time: p.start_time,
                }
            }
            "move" => {
                let p: MoveParams = parse_params(action, params)?;
                if p.track_id.is_none() && p.start_time.is_none() {
                    return Err(CoreError::InvalidCommand(
                        "move: expected trackId and/or startTime".to_string(),
                    ));
                }
                TimelineAction::Move {
                    track_id: p.track_id,
                    start_time: p.start_time,
                }
            }
            "add-effect" | "apply-effect" => {
                let spec: EffectSpec = parse_params(action, params)?;
                spec.effect_type
                    .validate_params(&spec.params)
                    .map_err(CoreError::ValidationError)?;
                TimelineAction::AddEffect(spec)
            }
            "add-track" => TimelineAction::AddTrack(parse_params(action, params)?),
            "remove-effect" => {
                let p: RemoveEffectParams = parse_params(action, params)?;
                TimelineAction::RemoveEffect {
                    effect_id: p.effect_id,
                }
            }
            "set-volume" => {
                let p: VolumeParams = parse_params(action, params)?;
                TimelineAction::SetVolume { level: p.level }
            }
            _ => TimelineAction::Unknown {
                action: action.to_string(),
                params: params.clone(),
            },
        };
        Ok(parsed)
    }

    /// Canonical action name
    pub fn name(&self) -> &str {
        match self {
            TimelineAction::Trim { .. } => "trim",
            TimelineAction::RemoveClip => "remove-clip",
            TimelineAction::Split { .. } => "split",
            TimelineAction::Duplicate { .. } => "duplicate",
            TimelineAction::Move { .. } => "move",
            TimelineAction::AddEffect(_) => "add-effect",
            TimelineAction::AddTrack(_) => "add-track",
            TimelineAction::RemoveEffect { .. } => "remove-effect",
            TimelineAction::SetVolume { .. } => "set-volume",
            TimelineAction::Unknown { action, .. } => action.as_str(),
        }
    }

    /// Whether the action runs once per target clip
    pub fn targets_clips(&self) -> bool {
        !matches!(
            self,
            TimelineAction::AddTrack(_) | TimelineAction::Unknown { .. }
        )
    }
}
