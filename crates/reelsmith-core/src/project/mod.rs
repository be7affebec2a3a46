//! Project Management Module
//!
//! Owns the in-memory project aggregate, its mutation engine and the
//! versioned project document used for persistence.

pub mod document;
mod engine;
mod state;

pub use document::{ProjectDocument, PROJECT_FILE_EXTENSION, PROJECT_FORMAT_VERSION};
pub use engine::MIN_CLIP_DURATION;
pub use state::{ProjectMeta, ProjectState, DEFAULT_FRAME_RATE};
