//! Source Commands Module

use serde::{Deserialize, Serialize};

use crate::{
    commands::{Command, CommandResult, StateChange},
    project::ProjectState,
    timeline::{Source, SourceSpec},
    CoreError, CoreResult, SourceId,
};

// =============================================================================
// AddSourceCommand
// =============================================================================

/// Command to register a media source
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSourceCommand {
    pub spec: SourceSpec,
    #[serde(skip)]
    created_source: Option<Source>,
}

impl AddSourceCommand {
    pub fn new(spec: SourceSpec) -> Self {
        Self {
            spec,
            created_source: None,
        }
    }

    fn added(source_id: &str) -> CommandResult {
        CommandResult::new()
            .with_change(StateChange::SourceAdded {
                source_id: source_id.to_string(),
            })
            .with_created_id(source_id)
    }
}

impl Command for AddSourceCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let source = state.add_source(self.spec.clone());
        let result = Self::added(&source.id);
        self.created_source = Some(source);
        Ok(result)
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(source) = &self.created_source {
            let usage = state.source_usage(&source.id);
            if usage > 0 {
                return Err(CoreError::ValidationError(format!(
                    "source {} is still used by {} clip(s)",
                    source.id, usage
                )));
            }
            state.take_source(&source.id);
        }
        Ok(())
    }

    fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        match &self.created_source {
            Some(source) => {
                state.restore_source(source.clone());
                Ok(Self::added(&source.id))
            }
            None => self.execute(state),
        }
    }

    fn type_name(&self) -> &'static str {
        "AddSource"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

// =============================================================================
// RenameSourceCommand
// =============================================================================

/// Command to rename a source
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSourceCommand {
    pub source_id: SourceId,
    pub name: String,
    #[serde(skip)]
    previous_name: Option<String>,
}

impl RenameSourceCommand {
    pub fn new(source_id: &str, name: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            name: name.to_string(),
            previous_name: None,
        }
    }
}

impl Command for RenameSourceCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let previous = state
            .source(&self.source_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| CoreError::SourceNotFound(self.source_id.clone()))?;

        state.rename_source(&self.source_id, &self.name)?;
        self.previous_name = Some(previous);

        Ok(CommandResult::new().with_change(StateChange::SourceModified {
            source_id: self.source_id.clone(),
        }))
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(name) = &self.previous_name {
            state.rename_source(&self.source_id, name)?;
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "RenameSource"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}
