//! Reelsmith Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::{ClipId, EffectId, SourceId, TimeSec, TrackId};

/// Broad classification of a [`CoreError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The entity an operation targets does not exist
    NotFound,
    /// A time or offset parameter is out of bounds
    InvalidRange,
    /// A dependent entity is missing at creation time
    Reference,
    /// The project document is newer than this build understands
    UnsupportedVersion,
    /// A command could not be parsed or is not executable
    Command,
    /// Undo/redo history is empty
    History,
    /// Failure at the provider boundary
    Provider,
    /// Storage, parsing and everything else
    Other,
}

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Timeline Errors
    // =========================================================================
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("Source not found: {0}")]
    SourceNotFound(SourceId),

    #[error("Effect not found: {0}")]
    EffectNotFound(EffectId),

    #[error("Missing {kind} reference: {id}")]
    MissingReference { kind: &'static str, id: String },

    #[error("Invalid split point: {0} seconds")]
    InvalidSplitPoint(TimeSec),

    #[error("Invalid {what}: {value}")]
    InvalidRange { what: &'static str, value: TimeSec },

    // =========================================================================
    // Project Errors
    // =========================================================================
    #[error("Unsupported project format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Project file corrupted: {0}")]
    ProjectCorrupted(String),

    // =========================================================================
    // Command Errors
    // =========================================================================
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action not implemented: {0}")]
    Unimplemented(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // =========================================================================
    // Provider Errors
    // =========================================================================
    #[error("No provider registered for {0}")]
    NoProvider(String),

    #[error("Provider request failed: {0}")]
    ProviderFailed(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Classifies the error for callers that branch on failure category
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ClipNotFound(_)
            | CoreError::TrackNotFound(_)
            | CoreError::SourceNotFound(_)
            | CoreError::EffectNotFound(_) => ErrorKind::NotFound,
            CoreError::InvalidSplitPoint(_) | CoreError::InvalidRange { .. } => {
                ErrorKind::InvalidRange
            }
            CoreError::MissingReference { .. } => ErrorKind::Reference,
            CoreError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            CoreError::InvalidCommand(_)
            | CoreError::UnknownAction(_)
            | CoreError::Unimplemented(_) => ErrorKind::Command,
            CoreError::NothingToUndo | CoreError::NothingToRedo => ErrorKind::History,
            CoreError::NoProvider(_)
            | CoreError::ProviderFailed(_)
            | CoreError::Cancelled(_)
            | CoreError::Timeout(_)
            | CoreError::NotSupported(_) => ErrorKind::Provider,
            CoreError::ProjectNotFound(_)
            | CoreError::ProjectCorrupted(_)
            | CoreError::ValidationError(_)
            | CoreError::IoError(_)
            | CoreError::JsonError(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn invalid_range(what: &'static str, value: TimeSec) -> Self {
        CoreError::InvalidRange { what, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(CoreError::ClipNotFound("c".into()).kind(), ErrorKind::NotFound);
        assert_eq!(CoreError::InvalidSplitPoint(3.0).kind(), ErrorKind::InvalidRange);
        assert_eq!(
            CoreError::MissingReference {
                kind: "source",
                id: "s".into()
            }
            .kind(),
            ErrorKind::Reference
        );
        assert_eq!(
            CoreError::UnsupportedVersion {
                found: 9,
                supported: 1
            }
            .kind(),
            ErrorKind::UnsupportedVersion
        );
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::MissingReference {
            kind: "track",
            id: "01ABC".into(),
        };
        assert_eq!(err.to_string(), "Missing track reference: 01ABC");

        let err = CoreError::invalid_range("duration", -1.0);
        assert_eq!(err.to_string(), "Invalid duration: -1");
    }
}
