//! Effect Commands Module
//!
//! Effects are owned by clips; applying one appends it to the clip's chain.

use serde::{Deserialize, Serialize};

use crate::{
    commands::{Command, CommandResult, StateChange},
    project::ProjectState,
    timeline::{Effect, EffectSpec},
    ClipId, CoreError, CoreResult,
};

/// Command to append an effect to a clip
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEffectCommand {
    pub clip_id: ClipId,
    pub spec: EffectSpec,
    #[serde(skip)]
    created_effect: Option<Effect>,
}

impl AddEffectCommand {
    pub fn new(clip_id: &str, spec: EffectSpec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            spec,
            created_effect: None,
        }
    }

    fn applied(&self, effect_id: &str) -> CommandResult {
        CommandResult::new()
            .with_change(StateChange::EffectApplied {
                clip_id: self.clip_id.clone(),
                effect_id: effect_id.to_string(),
            })
            .with_created_id(effect_id)
    }
}

impl Command for AddEffectCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        self.spec
            .effect_type
            .validate_params(&self.spec.params)
            .map_err(CoreError::ValidationError)?;

        let effect = state
            .add_effect(&self.clip_id, self.spec.clone())
            .ok_or_else(|| CoreError::ClipNotFound(self.clip_id.clone()))?;
        let result = self.applied(&effect.id);
        self.created_effect = Some(effect);
        Ok(result)
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some(effect) = &self.created_effect {
            state
                .remove_effect(&self.clip_id, &effect.id)
                .ok_or_else(|| CoreError::EffectNotFound(effect.id.clone()))?;
        }
        Ok(())
    }

    fn redo(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let Some(effect) = self.created_effect.clone() else {
            return self.execute(state);
        };
        let effect_id = effect.id.clone();
        if !state.restore_effect(&self.clip_id, usize::MAX, effect) {
            return Err(CoreError::ClipNotFound(self.clip_id.clone()));
        }
        Ok(self.applied(&effect_id))
    }

    fn type_name(&self) -> &'static str {
        "AddEffect"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}
