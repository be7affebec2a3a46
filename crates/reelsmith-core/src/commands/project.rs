//! Project Settings Command

use serde::{Deserialize, Serialize};

use crate::{
    commands::{Command, CommandResult, StateChange},
    project::ProjectState,
    AspectRatio, CoreError, CoreResult,
};

/// Command to update the project name and output format
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectSettingsCommand {
    pub name: Option<String>,
    pub aspect_ratio: Option<AspectRatio>,
    pub frame_rate: Option<u32>,
    #[serde(skip)]
    previous: Option<(String, AspectRatio, u32)>,
}

impl UpdateProjectSettingsCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }
}

impl Command for UpdateProjectSettingsCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        if self.name.is_none() && self.aspect_ratio.is_none() && self.frame_rate.is_none() {
            return Err(CoreError::ValidationError(
                "no project settings to update".to_string(),
            ));
        }
        if self.frame_rate == Some(0) {
            return Err(CoreError::ValidationError(
                "frameRate must be a positive integer".to_string(),
            ));
        }

        let meta = state.meta();
        let previous = (meta.name.clone(), meta.aspect_ratio, meta.frame_rate);

        if let Some(name) = &self.name {
            state.set_name(name);
        }
        if let Some(aspect_ratio) = self.aspect_ratio {
            state.set_aspect_ratio(aspect_ratio);
        }
        if let Some(frame_rate) = self.frame_rate {
            state.set_frame_rate(frame_rate)?;
        }

        self.previous = Some(previous);
        Ok(CommandResult::new().with_change(StateChange::ProjectModified))
    }

    fn undo(&self, state: &mut ProjectState) -> CoreResult<()> {
        if let Some((name, aspect_ratio, frame_rate)) = &self.previous {
            state.set_name(name);
            state.set_aspect_ratio(*aspect_ratio);
            state.set_frame_rate(*frame_rate)?;
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "UpdateProjectSettings"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_project_settings() {
        let mut state = ProjectState::new("Draft");

        let mut cmd = UpdateProjectSettingsCommand::new()
            .with_name("Launch Teaser")
            .with_aspect_ratio(AspectRatio::Square)
            .with_frame_rate(60);
        cmd.execute(&mut state).unwrap();

        assert_eq!(state.meta().name, "Launch Teaser");
        assert_eq!(state.meta().aspect_ratio, AspectRatio::Square);
        assert_eq!(state.meta().frame_rate, 60);

        cmd.undo(&mut state).unwrap();
        assert_eq!(state.meta().name, "Draft");
        assert_eq!(state.meta().aspect_ratio, AspectRatio::Landscape);
        assert_eq!(state.meta().frame_rate, 30);
    }

    #[test]
    fn test_zero_frame_rate_leaves_state_untouched() {
        let mut state = ProjectState::new("Draft");
        let mut cmd = UpdateProjectSettingsCommand::new()
            .with_name("Renamed")
            .with_frame_rate(0);

        assert!(cmd.execute(&mut state).is_err());
        assert_eq!(state.meta().name, "Draft");
    }
}
