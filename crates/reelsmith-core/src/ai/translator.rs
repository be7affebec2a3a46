//! Command Translator Module
//!
//! Maps generic timeline commands onto undoable engine commands. A batch never
//! aborts: every command yields an outcome and later commands see the effects
//! of earlier ones.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::edit_script::{TimelineAction, TimelineCommand};
use crate::{
    commands::{
        AddEffectCommand, AddTrackCommand, Command, CommandExecutor, DuplicateClipCommand,
        MoveClipCommand, RemoveClipCommand, SplitClipCommand, TrimClipCommand,
    },
    project::ProjectState,
    CoreError, CoreResult,
};

// =============================================================================
// Outcomes
// =============================================================================

/// Result of one command in a batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    /// Position in the batch
    pub index: usize,
    /// Action name as given
    pub action: String,
    /// Command description (or action name)
    pub description: String,
    pub success: bool,
    /// Error message when the command failed
    pub error: Option<String>,
    /// Ids of entities the command created
    pub created_ids: Vec<String>,
}

/// Result of executing a batch of commands
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Number of commands that succeeded
    pub executed: usize,
    /// Number of commands in the batch
    pub total: usize,
    pub outcomes: Vec<CommandOutcome>,
}

impl BatchOutcome {
    /// True when every command succeeded
    pub fn is_complete(&self) -> bool {
        self.executed == self.total
    }

    /// True when at least one command changed the project
    pub fn any_succeeded(&self) -> bool {
        self.executed > 0
    }

    /// One-line summary, e.g. "Executed 2/3 commands"
    pub fn summary(&self) -> String {
        format!("Executed {}/{} commands", self.executed, self.total)
    }
}

// =============================================================================
// Command Translator
// =============================================================================

/// Stateless mapping from timeline commands to engine commands
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandTranslator;

impl CommandTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Executes commands sequentially in queue order
    pub fn execute_batch(
        &self,
        commands: &[TimelineCommand],
        state: &mut ProjectState,
        executor: &mut CommandExecutor,
    ) -> BatchOutcome {
        let mut batch = BatchOutcome {
            total: commands.len(),
            ..Default::default()
        };

        for (index, command) in commands.iter().enumerate() {
            let outcome = match self.execute_command(command, state, executor) {
                Ok(created_ids) => {
                    batch.executed += 1;
                    CommandOutcome {
                        index,
                        action: command.action.clone(),
                        description: command.label().to_string(),
                        success: true,
                        error: None,
                        created_ids,
                    }
                }
                Err(e) => {
                    warn!("Command {} ({}) failed: {}", index, command.action, e);
                    CommandOutcome {
                        index,
                        action: command.action.clone(),
                        description: command.label().to_string(),
                        success: false,
                        error: Some(e.to_string()),
                        created_ids: vec![],
                    }
                }
            };
            batch.outcomes.push(outcome);
        }

        info!("{}", batch.summary());
        batch
    }

    /// Executes one command; returns the ids it created.
    ///
    /// Multi-clip commands run once per target in order. The command
    /// succeeds only if every target does; successful targets stay applied.
    pub fn execute_command(
        &self,
        command: &TimelineCommand,
        state: &mut ProjectState,
        executor: &mut CommandExecutor,
    ) -> CoreResult<Vec<String>> {
        let action = TimelineAction::parse(&command.action, &command.params)?;

        match &action {
            TimelineAction::Unknown { action, .. } => {
                return Err(CoreError::UnknownAction(action.clone()))
            }
            TimelineAction::RemoveEffect { .. } | TimelineAction::SetVolume { .. } => {
                return Err(CoreError::Unimplemented(action.name().to_string()))
            }
            _ => {}
        }

        if !action.targets_clips() {
            let engine_command = Self::build(&action, None, state)?;
            return Ok(executor.execute(engine_command, state)?.created_ids);
        }

        if command.clip_ids.is_empty() {
            return Err(CoreError::InvalidCommand(format!(
                "{} requires at least one clip id",
                action.name()
            )));
        }

        let mut created_ids = Vec::new();
        let mut failures: Vec<(String, CoreError)> = Vec::new();
        for clip_id in &command.clip_ids {
            let result = Self::build(&action, Some(clip_id.as_str()), state)
                .and_then(|cmd| executor.execute(cmd, state));
            match result {
                Ok(result) => created_ids.extend(result.created_ids),
                Err(e) => failures.push((clip_id.clone(), e)),
            }
        }

        let total = command.clip_ids.len();
        match failures.len() {
            0 => Ok(created_ids),
            1 if total == 1 => Err(failures.remove(0).1),
            n => {
                let details: Vec<String> = failures
                    .iter()
                    .map(|(id, e)| format!("{}: {}", id, e))
                    .collect();
                Err(CoreError::InvalidCommand(format!(
                    "{} failed for {} of {} clips ({})",
                    action.name(),
                    n,
                    total,
                    details.join("; ")
                )))
            }
        }
    }

    fn build(
        action: &TimelineAction,
        clip_id: Option<&str>,
        state: &ProjectState,
    ) -> CoreResult<Box<dyn Command>> {
        let target = || {
            clip_id
                .map(str::to_string)
                .ok_or_else(|| CoreError::InvalidCommand(format!("{} needs a clip", action.name())))
        };

        let command: Box<dyn Command> = match action {
            TimelineAction::Trim {
                start_offset,
                duration,
            } => {
                let mut cmd = TrimClipCommand::new(&target()?);
                cmd.start_offset = *start_offset;
                cmd.duration = *duration;
                Box::new(cmd)
            }
            TimelineAction::RemoveClip => Box::new(RemoveClipCommand::new(&target()?)),
            TimelineAction::Split { at } => Box::new(SplitClipCommand::new(&target()?, *at)),
            TimelineAction::Duplicate { start_time } => {
                Box::new(DuplicateClipCommand::new(&target()?, *start_time))
            }
            TimelineAction::Move {
                track_id,
                start_time,
            } => {
                let clip_id = target()?;
                let clip = state
                    .clip(&clip_id)
                    .ok_or_else(|| CoreError::ClipNotFound(clip_id.clone()))?;
                let track_id = track_id.clone().unwrap_or_else(|| clip.track_id.clone());
                let start = start_time.unwrap_or(clip.start_time);
                Box::new(MoveClipCommand::new(&clip_id, &track_id, start))
            }
            TimelineAction::AddEffect(spec) => {
                Box::new(AddEffectCommand::new(&target()?, spec.clone()))
            }
            TimelineAction::AddTrack(spec) => Box::new(AddTrackCommand::new(spec.clone())),
            TimelineAction::RemoveEffect { .. } | TimelineAction::SetVolume { .. } => {
                return Err(CoreError::Unimplemented(action.name().to_string()))
            }
            TimelineAction::Unknown { action, .. } => {
                return Err(CoreError::UnknownAction(action.clone()))
            }
        };
        Ok(command)
    }
}

// =============================================================================
// Tests
// =============================================================================
