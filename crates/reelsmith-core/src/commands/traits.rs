//! Command Trait Definition
//!
//! Defines the trait that all edit commands must implement.

use serde::{Deserialize, Serialize};

use crate::{new_id, project::ProjectState, CoreResult, OpId};

/// Command execution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// Generated Operation ID
    pub op_id: OpId,

    /// List of state changes
    pub changes: Vec<StateChange>,

    /// Newly created IDs (sources, clips, tracks, effects)
    pub created_ids: Vec<String>,

    /// Deleted IDs
    pub deleted_ids: Vec<String>,
}

impl CommandResult {
    /// Creates an empty result with a fresh operation ID
    pub fn new() -> Self {
        Self {
            op_id: new_id(),
            changes: vec![],
            created_ids: vec![],
            deleted_ids: vec![],
        }
    }

    /// Adds a state change
    pub fn with_change(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    /// Adds a created ID
    pub fn with_created_id(mut self, id: &str) -> Self {
        self.created_ids.push(id.to_string());
        self
    }

    /// Adds a deleted ID
    pub fn with_deleted_id(mut self, id: &str) -> Self {
        self.deleted_ids.push(id.to_string());
        self
    }
}

impl Default for CommandResult {
    fn default() -> Self {
        Self::new()
    }
}

/// State change types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateChange {
    #[serde(rename_all = "camelCase")]
    SourceAdded { source_id: String },
    #[serde(rename_all = "camelCase")]
    SourceModified { source_id: String },
    #[serde(rename_all = "camelCase")]
    TrackCreated { track_id: String },
    #[serde(rename_all = "camelCase")]
    TrackModified { track_id: String },
    #[serde(rename_all = "camelCase")]
    ClipCreated { clip_id: String },
    #[serde(rename_all = "camelCase")]
    ClipModified { clip_id: String },
    #[serde(rename_all = "camelCase")]
    ClipDeleted { clip_id: String },
    #[serde(rename_all = "camelCase")]
    EffectApplied { clip_id: String, effect_id: String },
    ProjectModified,
}

/// Trait that all edit commands must implement
///
/// Every command is undoable and serializable. `execute` must leave the state
/// untouched when it fails; `undo` is only called after a successful execute.
pub trait Command: Send + Sync {
    /// Applies the command, recording whatever `undo` needs
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult>;

    /// Reverts a successful execute
    fn undo(&self, state: &mut ProjectState) -> CoreResult<()>;

    /// Re-applies after an undo. Commands that create entities override this
    /// to restore the same ids.
    fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        self.execute(state)
    }

    /// Command type name, used in logs and batch reports
    fn type_name(&self) -> &'static str;

    /// JSON form of the command's parameters
    fn to_json(&self) -> serde_json::Value;
}
