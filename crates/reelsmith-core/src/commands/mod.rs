//! Edit Command System
//!
//! Undoable wrappers around the project engine. Anything that should show up
//! in undo/redo history goes through a [`Command`] run by a
//! [`CommandExecutor`].

mod clip;
mod effect;
mod executor;
mod project;
mod source;
mod track;
mod traits;

pub use clip::*;
pub use effect::*;
pub use executor::*;
pub use project::*;
pub use source::*;
pub use track::*;
pub use traits::*;
