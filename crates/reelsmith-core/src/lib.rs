//! Reelsmith Core Engine
//!
//! Headless timeline engine for AI-assisted video editing.
//! Holds the project model, its mutation and undo machinery, the translator
//! that turns generic timeline commands into edits, versioned project files,
//! and the contracts generative providers implement.

pub mod ai;
pub mod commands;
pub mod generative;
pub mod project;
pub mod settings;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
