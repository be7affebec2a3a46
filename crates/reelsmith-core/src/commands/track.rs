//! Track Commands Module

use serde::{Deserialize, Serialize};

use crate::{
    commands::{Command, CommandResult, StateChange},
    project::ProjectState,
    timeline::{Track, TrackSpec},
    CoreError, CoreResult, TrackId,
};

// =============================================================================
// AddTrackCommand
// =============================================================================

/// Command to append a new track lane
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTrackCommand {
    pub spec: TrackSpec,
    #[serde(skip)]
    created_track: Option<Track>,
}

impl AddTrackCommand {
    pub fn new(spec: TrackSpec) -> Self {
        Self {
            spec,
            created_track: None,
        }
    }

    fn created(track_id: &str) -> CommandResult {
        CommandResult::new()
            .with_change(StateChange::TrackCreated {
                track_id: track_id.to_string(),
            })
            .with_created_id(track_id)
    }
}

impl Command for AddTrackCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let track = state.add_track(self.spec.clone());
        let result = Self::created(&track.id);
        self.created_track = Some(track);
        Ok(result)
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(track) = &self.created_track {
            if !state.clips_by_track(&track.id).is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "track {} still holds clips",
                    track.id
                )));
            }
            state.take_track(&track.id);
        }
        Ok(())
    }

    fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        match &self.created_track {
            Some(track) => {
                state.restore_track(track.clone());
                Ok(Self::created(&track.id))
            }
            None => self.execute(state),
        }
    }

    fn type_name(&self) -> &'static str {
        "AddTrack"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// SetTrackFlagsCommand
// =============================================================================

/// Command to toggle a track's muted/locked/visible flags
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTrackFlagsCommand {
    pub track_id: TrackId,
    pub muted: Option<bool>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    #[serde(skip)]
    previous: Option<(bool, bool, bool)>,
}

impl SetTrackFlagsCommand {
    pub fn new(track_id: &str) -> Self {
        Self {
            track_id: track_id.to_string(),
            muted: None,
            locked: None,
            visible: None,
            previous: None,
        }
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = Some(muted);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }
}

impl Command for SetTrackFlagsCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let track = state
            .track(&self.track_id)
            .ok_or_else(|| CoreError::TrackNotFound(self.track_id.clone()))?;
        let previous = (track.muted, track.locked, track.visible);

        state.set_track_flags(&self.track_id, self.muted, self.locked, self.visible)?;
        self.previous = Some(previous);

        Ok(CommandResult::new().with_change(StateChange::TrackModified {
            track_id: self.track_id.clone(),
        }))
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some((muted, locked, visible)) = self.previous {
            state.set_track_flags(&self.track_id, Some(muted), Some(locked), Some(visible))?;
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "SetTrackFlags"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}
