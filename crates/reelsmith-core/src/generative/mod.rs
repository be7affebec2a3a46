//! Generative AI Integration
//!
//! Provider contracts for image, speech, sound effect, video and
//! transcription generation, plus the registry that routes requests and the
//! import step that turns finished artifacts into project sources.

mod import;
pub mod providers;
mod registry;

pub use import::import_artifact;
pub use providers::{
    GeneratedArtifact, GenerationOptions, GenerationOutcome, GenerativeProvider,
    GenerativeProviderConfig, MockGenerativeProvider, ProgressFn, ProviderCapability, TaskStatus,
    DEFAULT_POLL_INTERVAL,
};
pub use registry::{ProviderRegistry, DEFAULT_GENERATION_TIMEOUT};
