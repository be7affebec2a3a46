//! Clip Commands Module
//!
//! Implements all clip-related editing commands.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{Command, CommandResult, StateChange},
    is_valid_duration,
    project::ProjectState,
    timeline::{Clip, ClipSpec},
    ClipId, CoreError, CoreResult, TimeSec, TrackId,
};

fn modified(clip_id: &str) -> CommandResult {
    CommandResult::new().with_change(StateChange::ClipModified {
        clip_id: clip_id.to_string(),
    })
}

fn created(clip_id: &str) -> CommandResult {
    CommandResult::new()
        .with_change(StateChange::ClipCreated {
            clip_id: clip_id.to_string(),
        })
        .with_created_id(clip_id)
}

// =============================================================================
// AddClipCommand
// =============================================================================

/// Command to place a source window on a track
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddClipCommand {
    pub spec: ClipSpec,
    /// Created clip (stored after execution for undo/redo)
    #[serde(skip)]
    created_clip: Option<Clip>,
}

impl AddClipCommand {
    pub fn new(spec: ClipSpec) -> Self {
        Self {
            spec,
            created_clip: None,
        }
    }
}

impl Command for AddClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let clip = state.add_clip(self.spec.clone())?;
        let result = created(&clip.id);
        self.created_clip = Some(clip);
        Ok(result)
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(clip) = &self.created_clip {
            state.take_clip(&clip.id);
        }
        Ok(())
    }

    fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        match &self.created_clip {
            Some(clip) => {
                state.restore_clip(state.clip_count(), clip.clone());
                Ok(created(&clip.id))
            }
            None => self.execute(state),
        }
    }

    fn type_name(&self) -> &'static str {
        "AddClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RemoveClipCommand
// =============================================================================

/// Command to remove a clip and its effects
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveClipCommand {
    pub clip_id: ClipId,
    /// Removed clip and its collection index (for undo)
    #[serde(skip)]
    removed: Option<(usize, Clip)>,
}

impl RemoveClipCommand {
    pub fn new(clip_id: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            removed: None,
        }
    }
}

impl Command for RemoveClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let removed = state
            .take_clip(&self.clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;
        self.removed = Some(removed);

        Ok(CommandResult::new()
            .with_change(StateChange::ClipDeleted {
                clip_id: self.clip_id.clone(),
            })
            .with_deleted_id(&self.clip_id))
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some((index, clip)) = &self.removed {
            state.restore_clip(*index, clip.clone());
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RemoveClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// TrimClipCommand
// =============================================================================

/// Command to trim a clip's in-point and/or duration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimClipCommand {
    pub clip_id: ClipId,
    /// New source in-point
    pub start_offset: Option<TimeSec>,
    /// New duration, applied after the in-point
    pub duration: Option<TimeSec>,
    #[serde(skip)]
    original_clip: Option<Clip>,
}

impl TrimClipCommand {
    pub fn new(clip_id: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            start_offset: None,
            duration: None,
            original_clip: None,
        }
    }

    pub fn with_start_offset(mut self, offset: TimeSec) -> Self {
        self.start_offset = Some(offset);
        self
    }

    pub fn with_duration(mut self, duration: TimeSec) -> Self {
        self.duration = Some(duration);
        self
    }

    fn apply(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(offset) = self.start_offset {
            state.trim_clip_start(&self.clip_id, offset)?;
        }
        if let Some(d) = self.duration {
            state.trim_clip_end(&self.clip_id, d)?;
        }
        Ok(())
    }
}

impl Command for TrimClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let original = state
            .clip(&self.clip_id)
            .cloned()
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;

        if self.start_offset.is_none() && self.duration.is_none() {
            return Err(CoreError::ValidationError(
                "trim needs a start offset or a duration".to_string(),
            ));
        }
        if let Some(d) = self.duration {
            if !is_valid_duration(d) {
                return Err(CoreError::invalid_range("duration", d));
            }
        }

        if let Err(e) = self.apply(state) {
            state.replace_clip(original)?;
            return Err(e);
        }

        self.original_clip = Some(original);
        Ok(modified(&self.clip_id))
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(original) = &self.original_clip {
            state.replace_clip(original.clone())?;
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "TrimClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SplitClipCommand
// =============================================================================

/// Command to split a clip at a timeline time
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitClipCommand {
    pub clip_id: ClipId,
    /// Absolute timeline time to split at
    pub split_at: TimeSec,
    #[serde(skip)]
    original_clip: Option<Clip>,
    /// Both halves as produced by the split (for redo)
    #[serde(skip)]
    halves: Option<(Clip, Clip)>,
}

impl SplitClipCommand {
    pub fn new(clip_id: &str, split_at: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            split_at,
            original_clip: None,
            halves: None,
        }
    }

    fn split_result(first_id: &str, second_id: &str) -> CommandResult {
        CommandResult::new()
            .with_change(StateChange::ClipModified {
                clip_id: first_id.to_string(),
            })
            .with_change(StateChange::ClipCreated {
                clip_id: second_id.to_string(),
            })
            .with_created_id(second_id)
    }
}

impl Command for SplitClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let original = state
            .clip(&self.clip_id)
            .cloned()
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;

        let (first_id, second_id) = state.split_clip(&self.clip_id, self.split_at)?;

        let first = state.clip(&first_id).cloned();
        let second = state.clip(&second_id).cloned();
        self.halves = first.zip(second);
        self.original_clip = Some(original);

        Ok(Self::split_result(&first_id, &second_id))
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let (Some(original), Some((_, second))) = (&self.original_clip, &self.halves) {
            state.take_clip(&second.id);
            state.replace_clip(original.clone())?;
        }
        Ok(())
    }

    fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let Some((first, second)) = self.halves.clone() else {
            return self.execute(state);
        };
        let index = state
            .clip_index(&first.id)
            .ok_or_else(|| CoreError::ClipNotFound(first.id.clone()))?;

        let result = Self::split_result(&first.id, &second.id);
        state.replace_clip(first)?;
        state.restore_clip(index + 1, second);
        Ok(result)
    }

    fn type_name(&self) -> &'static str {
        "SplitClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// DuplicateClipCommand
// =============================================================================

/// Command to clone a clip under a new id
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateClipCommand {
    pub clip_id: ClipId,
    /// Start of the copy; defaults to right after the original
    pub new_start: Option<TimeSec>,
    #[serde(skip)]
    created_clip: Option<Clip>,
}

impl DuplicateClipCommand {
    pub fn new(clip_id: &str, new_start: Option<TimeSec>) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            new_start,
            created_clip: None,
        }
    }
}

impl Command for DuplicateClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let copy = state.duplicate_clip(&self.clip_id, self.new_start)?;
        let result = created(&copy.id);
        self.created_clip = Some(copy);
        Ok(result)
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(copy) = &self.created_clip {
            state.take_clip(&copy.id);
        }
        Ok(())
    }

    fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        match &self.created_clip {
            Some(copy) => {
                state.restore_clip(state.clip_count(), copy.clone());
                Ok(created(&copy.id))
            }
            None => self.execute(state),
        }
    }

    fn type_name(&self) -> &'static str {
        "DuplicateClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// MoveClipCommand
// =============================================================================

/// Command to move a clip to a track and timeline position
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveClipCommand {
    pub clip_id: ClipId,
    pub track_id: TrackId,
    pub new_start: TimeSec,
    #[serde(skip)]
    original_clip: Option<Clip>,
}

impl MoveClipCommand {
    pub fn new(clip_id: &str, track_id: &str, new_start: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            track_id: track_id.to_string(),
            new_start,
            original_clip: None,
        }
    }
}

impl Command for MoveClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let original = state
            .clip(&self.clip_id)
            .cloned()
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;

        state.move_clip(&self.clip_id, &self.track_id, self.new_start)?;
        self.original_clip = Some(original);
        Ok(modified(&self.clip_id))
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(original) = &self.original_clip {
            state.replace_clip(original.clone())?;
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "MoveClip"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// Tests
// =============================================================================
