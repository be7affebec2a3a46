//! AI Command Layer
//!
//! Turns generic timeline commands (from a natural-language parser or a
//! script) into project edits.

mod edit_script;
mod source;
mod translator;

pub use edit_script::{CommandScript, TimelineAction, TimelineCommand};
pub use source::{CommandSource, ScriptCommandSource};
pub use translator::{BatchOutcome, CommandOutcome, CommandTranslator};
