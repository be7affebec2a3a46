//! Command Executor Module
//!
//! Runs commands against a project and keeps bounded undo/redo history.

use std::collections::VecDeque;

use tracing::debug;

use crate::{
    commands::{Command, CommandResult},
    project::ProjectState,
    CoreError, CoreResult, OpId,
};

/// Default number of undoable steps kept
pub const DEFAULT_MAX_HISTORY: usize = 100;

// =============================================================================
// History Entry
// =============================================================================

/// Entry in the undo/redo history
pub struct HistoryEntry {
    /// Operation ID
    pub op_id: OpId,
    /// Command that was executed
    pub command: Box<dyn Command>,
    /// Result from command execution
    pub result: CommandResult,
    /// Timestamp when command was executed
    pub timestamp: String,
}

impl std::fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("op_id", &self.op_id)
            .field("command", &self.command.type_name())
            .field("result", &self.result)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

impl HistoryEntry {
    fn new(command: Box<dyn Command>, result: CommandResult) -> Self {
        Self {
            op_id: result.op_id.clone(),
            command,
            result,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =============================================================================
// Command Executor
// =============================================================================

/// Executes commands and manages undo/redo history
pub struct CommandExecutor {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_history_size: usize,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: DEFAULT_MAX_HISTORY,
        }
    }

    /// Sets the maximum history size (at least 1)
    pub fn with_max_history(mut self, size: usize) -> Self {
        self.max_history_size = size.max(1);
        self
    }

    /// Executes a command and adds it to history. Failed commands are not
    /// recorded.
    pub fn execute(
        &mut self,
        mut command: Box<dyn Command>,
        state: &mut ProjectState,
    ) -> CoreResult<CommandResult> {
        let result = command.execute(state)?;
        debug!(
            "Executed {} (op {}): {}",
            command.type_name(),
            result.op_id,
            command.to_json()
        );

        self.redo_stack.clear();
        self.undo_stack
            .push_back(HistoryEntry::new(command, result.clone()));
        while self.undo_stack.len() > self.max_history_size {
            self.undo_stack.pop_front();
        }

        state.is_dirty = true;
        Ok(result)
    }

    /// Undoes the last command
    pub fn undo(&mut self, state: &mut ProjectState) -> CoreResult<()> {
        let entry = self.undo_stack.pop_back().ok_or(CoreError::NothingToUndo)?;

        if let Err(e) = entry.command.undo(state) {
            self.undo_stack.push_back(entry);
            return Err(e);
        }
        debug!("Undid {} (op {})", entry.command.type_name(), entry.op_id);

        self.redo_stack.push_back(entry);
        state.is_dirty = true;
        Ok(())
    }

    /// Redoes the last undone command
    pub fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let mut entry = self.redo_stack.pop_back().ok_or(CoreError::NothingToRedo)?;

        let result = match entry.command.redo(state) {
            Ok(result) => result,
            Err(e) => {
                self.redo_stack.push_back(entry);
                return Err(e);
            }
        };
        debug!("Redid {} (op {})", entry.command.type_name(), result.op_id);

        entry.op_id = result.op_id.clone();
        entry.result = result.clone();
        entry.timestamp = chrono::Utc::now().to_rfc3339();
        self.undo_stack.push_back(entry);

        state.is_dirty = true;
        Ok(result)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clears all history (undo and redo)
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Gets the last executed command type name
    pub fn last_command_type(&self) -> Option<&'static str> {
        self.undo_stack.back().map(|e| e.command.type_name())
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
