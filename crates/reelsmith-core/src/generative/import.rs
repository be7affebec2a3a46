//! Artifact Import
//!
//! The one place generated content touches the project: a finished artifact
//! becomes a single new source.

use tracing::info;

use super::providers::GeneratedArtifact;
use crate::project::ProjectState;
use crate::timeline::{Source, SourceSpec};
use crate::{CoreError, CoreResult};

/// Adds a terminal artifact to the project as exactly one source.
///
/// Text-only artifacts (transcripts) carry no media and are rejected with
/// `NotSupported`; the project is left untouched.
pub fn import_artifact(
    state: &mut ProjectState,
    artifact: &GeneratedArtifact,
) -> CoreResult<Source> {
    let media_type = artifact.media_type.ok_or_else(|| {
        CoreError::NotSupported(format!("artifact {} has no media to import", artifact.url))
    })?;

    let name = if artifact.name.trim().is_empty() {
        artifact.url.rsplit('/').next().unwrap_or(&artifact.url).to_string()
    } else {
        artifact.name.clone()
    };

    let mut spec = SourceSpec::new(&name, media_type, &artifact.url)
        .with_duration(artifact.duration.unwrap_or(0.0));
    if let (Some(width), Some(height)) = (artifact.width, artifact.height) {
        spec = spec.with_size(width, height);
    }

    let source = state.add_source(spec);
    info!("Imported generated {} as source {}", media_type, source.id);
    Ok(source)
}
