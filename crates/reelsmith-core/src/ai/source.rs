//! Command Sources
//!
//! Anything that turns user input into a list of timeline commands: an LLM
//! parser, a suggestion engine, or a script on disk. The core only cares
//! about the resulting command schema.

use async_trait::async_trait;
use serde_json::Value;

use super::edit_script::{CommandScript, TimelineCommand};
use crate::{CoreError, CoreResult};

/// Producer of timeline command queues
#[async_trait]
pub trait CommandSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Produces the commands for one piece of input
    async fn commands(&self, input: &str) -> CoreResult<Vec<TimelineCommand>>;
}

/// Reads commands from JSON text: either a bare array of commands or an
/// object with a `commands` array
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptCommandSource;

impl ScriptCommandSource {
    pub fn new() -> Self {
        Self
    }

    /// Parses a command script
    pub fn parse(json: &str) -> CoreResult<Vec<TimelineCommand>> {
        let value: Value = serde_json::from_str(json)?;
        let is_script = value.get("commands").is_some();
        match value {
            Value::Array(_) => Ok(serde_json::from_value(value)?),
            Value::Object(_) if is_script => {
                let script: CommandScript = serde_json::from_value(value)?;
                Ok(script.commands)
            }
            _ => Err(CoreError::InvalidCommand(
                "expected a JSON array of commands or an object with a \"commands\" array"
                    .to_string(),
            )),
        }
    }
}

#[async_trait]
impl CommandSource for ScriptCommandSource {
    fn name(&self) -> &str {
        "script"
    }

    async fn commands(&self, input: &str) -> CoreResult<Vec<TimelineCommand>> {
        Self::parse(input)
    }
}
