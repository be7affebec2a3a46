//! Subcommand handlers
//!
//! Shared plumbing for loading, editing and saving the project file.

pub mod apply;
pub mod batch;
pub mod project;
pub mod settings;
pub mod timeline;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use reelsmith_core::commands::{Command, CommandExecutor, CommandResult};
use reelsmith_core::project::{document, ProjectState};
use reelsmith_core::settings::AppSettings;
use reelsmith_core::timeline::{EffectParams, ParamValue};
use reelsmith_core::TimeSec;

/// Per-invocation state shared by every handler
#[derive(Debug)]
pub struct Context {
    pub project_path: PathBuf,
    pub settings: AppSettings,
}

impl Context {
    pub fn new(project_path: PathBuf, settings: AppSettings) -> Self {
        Self {
            project_path,
            settings,
        }
    }

    pub fn load(&self) -> Result<ProjectState> {
        document::load(&self.project_path)
            .with_context(|| format!("cannot open {}", self.project_path.display()))
    }

    pub fn save(&self, state: &mut ProjectState) -> Result<()> {
        document::save(&self.project_path, state)
            .with_context(|| format!("cannot write {}", self.project_path.display()))
    }

    pub fn executor(&self) -> CommandExecutor {
        CommandExecutor::new().with_max_history(self.settings.history.max_undo)
    }

    /// Loads the project, runs `edit`, and saves only if it succeeded
    pub fn edit<T>(
        &self,
        edit: impl FnOnce(&mut ProjectState, &mut CommandExecutor) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.load()?;
        let mut executor = self.executor();
        let value = edit(&mut state, &mut executor)?;
        if state.is_dirty {
            self.save(&mut state)?;
        }
        Ok(value)
    }
}

/// Runs one command and returns the first id it created
pub fn execute_creating(
    executor: &mut CommandExecutor,
    state: &mut ProjectState,
    command: impl Command + 'static,
) -> Result<String> {
    let result = executor.execute(Box::new(command), state)?;
    first_created(&result)
}

fn first_created(result: &CommandResult) -> Result<String> {
    match result.created_ids.first() {
        Some(id) => Ok(id.clone()),
        None => bail!("command did not create anything"),
    }
}

/// Parses repeated `key=value` arguments into effect parameters
pub fn parse_params(raw: &[String]) -> Result<EffectParams> {
    let mut params = EffectParams::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("invalid parameter '{}', expected key=value", entry);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("invalid parameter '{}', empty key", entry);
        }
        params.insert(key.to_string(), ParamValue::parse(value.trim()));
    }
    Ok(params)
}

/// Display name for a source locator: its final path segment
pub fn display_name(locator: &str) -> String {
    Path::new(locator)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| locator.to_string())
}

pub fn format_time(sec: TimeSec) -> String {
    format!("{:.3}s", sec)
}
