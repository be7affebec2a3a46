//! Project Document Module
//!
//! Versioned on-disk representation of a project. The document stores the
//! project header plus flat source, track and clip lists; effects stay nested
//! inside their clips. Older documents are migrated on read, newer ones are
//! rejected.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{state::DEFAULT_FRAME_RATE, ProjectMeta, ProjectState};
use crate::{
    timeline::{Clip, Source, Track},
    CoreError, CoreResult,
};

/// Current project document format version
pub const PROJECT_FORMAT_VERSION: u32 = 1;

/// Default project file extension
pub const PROJECT_FILE_EXTENSION: &str = "reelsmith.json";

// =============================================================================
// Document Types
// =============================================================================

/// Top-level project document
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    /// Format version for migrations
    pub version: u32,
    pub state: DocumentState,
}

/// Serialized project contents
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    pub project: ProjectMeta,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub clips: Vec<Clip>,
}

impl ProjectDocument {
    /// Captures the current state in collection order
    pub fn from_state(state: &ProjectState) -> Self {
        Self {
            version: PROJECT_FORMAT_VERSION,
            state: DocumentState {
                project: state.meta.clone(),
                sources: state.sources.values().cloned().collect(),
                tracks: state.tracks.values().cloned().collect(),
                clips: state.clips.values().cloned().collect(),
            },
        }
    }

    /// Rebuilds a project state, rejecting dangling references
    pub fn into_state(self) -> CoreResult<ProjectState> {
        let mut state = ProjectState::empty(self.state.project);

        for source in self.state.sources {
            let id = source.id.clone();
            if state.sources.insert(id.clone(), source).is_some() {
                return Err(CoreError::ProjectCorrupted(format!(
                    "duplicate source id {}",
                    id
                )));
            }
        }
        for track in self.state.tracks {
            let id = track.id.clone();
            if state.tracks.insert(id.clone(), track).is_some() {
                return Err(CoreError::ProjectCorrupted(format!(
                    "duplicate track id {}",
                    id
                )));
            }
        }
        for clip in self.state.clips {
            if !state.tracks.contains_key(&clip.track_id) {
                return Err(CoreError::ProjectCorrupted(format!(
                    "clip {} references missing track {}",
                    clip.id, clip.track_id
                )));
            }
            if !state.sources.contains_key(&clip.source_id) {
                return Err(CoreError::ProjectCorrupted(format!(
                    "clip {} references missing source {}",
                    clip.id, clip.source_id
                )));
            }
            let id = clip.id.clone();
            if state.clips.insert(id.clone(), clip).is_some() {
                return Err(CoreError::ProjectCorrupted(format!(
                    "duplicate clip id {}",
                    id
                )));
            }
        }

        // Derived; never trusted from disk
        state.meta.duration = state.compute_duration();
        state.is_dirty = false;
        Ok(state)
    }
}

// =============================================================================
// Serialization
// =============================================================================

/// Serializes a project to a pretty-printed JSON document
pub fn serialize(state: &ProjectState) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(&ProjectDocument::from_state(
        state,
    ))?)
}

/// Parses a JSON document, migrating older versions
pub fn deserialize(json: &str) -> CoreResult<ProjectState> {
    let mut value: Value = serde_json::from_str(json)?;

    let version = match value.get("version") {
        None => 0,
        Some(v) => v
            .as_u64()
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .ok_or_else(|| CoreError::ProjectCorrupted(format!("invalid version {}", v)))?,
    };

    if version > PROJECT_FORMAT_VERSION {
        return Err(CoreError::UnsupportedVersion {
            found: version,
            supported: PROJECT_FORMAT_VERSION,
        });
    }
    if version < PROJECT_FORMAT_VERSION {
        value = migrate(value, version)?;
    }

    let document: ProjectDocument = serde_json::from_value(value)?;
    document.into_state()
}

/// Upgrades a raw document to the current version
fn migrate(mut value: Value, from: u32) -> CoreResult<Value> {
    info!(
        "Migrating project document from version {} to {}",
        from, PROJECT_FORMAT_VERSION
    );

    // v0 headers carried only the project name
    if from < 1 {
        let project = value
            .pointer_mut("/state/project")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| CoreError::ProjectCorrupted("missing project header".to_string()))?;

        let now = chrono::Utc::now().to_rfc3339();
        project.entry("aspectRatio").or_insert_with(|| json!("16:9"));
        project
            .entry("frameRate")
            .or_insert_with(|| json!(DEFAULT_FRAME_RATE));
        project.entry("duration").or_insert_with(|| json!(0.0));
        project
            .entry("createdAt")
            .or_insert_with(|| json!(now.clone()));
        project.entry("modifiedAt").or_insert_with(|| json!(now));
    }

    if let Some(root) = value.as_object_mut() {
        root.insert("version".to_string(), json!(PROJECT_FORMAT_VERSION));
    }
    Ok(value)
}

// =============================================================================
// File I/O
// =============================================================================

/// Writes the project atomically (temp file + rename) and clears the dirty flag
pub fn save(path: &Path, state: &mut ProjectState) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let document = ProjectDocument::from_state(state);
    let temp_path = path.with_extension("json.tmp");
    if let Err(e) = write_replacing(&temp_path, path, &document) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    state.is_dirty = false;
    info!(
        "Saved project '{}' to {:?} ({} clips)",
        state.meta.name,
        path,
        state.clip_count()
    );
    Ok(())
}

fn write_replacing(
    temp_path: &Path,
    path: &Path,
    document: &ProjectDocument,
) -> CoreResult<()> {
    let file = File::create(temp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);
    fs::rename(temp_path, path)?;
    Ok(())
}

/// Loads a project from disk
pub fn load(path: &Path) -> CoreResult<ProjectState> {
    if !path.exists() {
        return Err(CoreError::ProjectNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let content = fs::read_to_string(path)?;
    let state = deserialize(&content)?;
    debug!(
        "Loaded project '{}' from {:?} ({} sources, {} tracks, {} clips)",
        state.meta.name,
        path,
        state.source_count(),
        state.track_count(),
        state.clip_count()
    );
    Ok(state)
}

/// Default project file path inside a directory
pub fn default_path(dir: &Path) -> PathBuf {
    dir.join(format!("project.{}", PROJECT_FILE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        timeline::{ClipSpec, EffectSpec, EffectType, ParamValue, SourceSpec, TrackKind},
        AspectRatio, ErrorKind, MediaType,
    };
    use tempfile::TempDir;

    fn create_test_state() -> ProjectState {
        let mut state = ProjectState::with_format("Round Trip", AspectRatio::Portrait, 24);
        let track_id = state.first_track_of(TrackKind::Video).unwrap().id.clone();
        let source = state.add_source(
            SourceSpec::new("intro", MediaType::Video, "https://cdn.example/intro.mp4")
                .with_duration(12.5)
                .with_size(1080, 1920),
        );
        let clip = state
            .add_clip(ClipSpec::new(&source.id, &track_id, 1.25).with_offset(0.5))
            .unwrap();
        state
            .add_effect(
                &clip.id,
                EffectSpec::new(EffectType::Blur)
                    .window(0.0, 2.0)
                    .with_param("radius", ParamValue::Number(3.5)),
            )
            .unwrap();
        state
            .add_effect(&clip.id, EffectSpec::new(EffectType::from("vhs")))
            .unwrap();
        state.split_clip(&clip.id, 5.0).unwrap();
        state
    }

    #[test]
    fn test_round_trip_is_exact() {
        let state = create_test_state();
        let json = serialize(&state).unwrap();
        let restored = deserialize(&json).unwrap();

        assert_eq!(restored.meta(), state.meta());
        assert_eq!(
            restored.clips().collect::<Vec<_>>(),
            state.clips().collect::<Vec<_>>()
        );
        assert_eq!(
            restored.tracks().collect::<Vec<_>>(),
            state.tracks().collect::<Vec<_>>()
        );
        assert_eq!(
            restored.sources().collect::<Vec<_>>(),
            state.sources().collect::<Vec<_>>()
        );
        assert_eq!(serialize(&restored).unwrap(), json);
        assert!(!restored.is_dirty);
    }

    #[test]
    fn test_round_trip_keeps_computed_offsets() {
        let source_duration = 1000.0 / 7.0;
        for i in 1..200 {
            let mut state = ProjectState::new("Precision");
            let track_id = state.first_track_of(TrackKind::Video).unwrap().id.clone();
            let source = state.add_source(
                SourceSpec::new("take", MediaType::Video, "/m/take.mov")
                    .with_duration(source_duration),
            );
            let offset = source_duration / (i as f64 + 2.0);
            let clip = state
                .add_clip(ClipSpec::new(&source.id, &track_id, 0.1 * i as f64).with_offset(offset))
                .unwrap();
            let at = clip.start_time + clip.duration * 0.3141592653589793;
            state.split_clip(&clip.id, at).unwrap();

            let restored = deserialize(&serialize(&state).unwrap()).unwrap();
            assert_eq!(
                restored.clips().collect::<Vec<_>>(),
                state.clips().collect::<Vec<_>>(),
                "clip values drifted for split #{}",
                i
            );
            assert_eq!(restored.duration(), state.duration());
        }
    }

    #[test]
    fn test_document_field_names() {
        let state = create_test_state();
        let value: Value = serde_json::from_str(&serialize(&state).unwrap()).unwrap();

        assert_eq!(value["version"], PROJECT_FORMAT_VERSION);
        assert_eq!(value["state"]["project"]["aspectRatio"], "9:16");
        assert_eq!(value["state"]["project"]["frameRate"], 24);
        let clip = &value["state"]["clips"][0];
        assert!(clip["sourceStartOffset"].is_number());
        assert!(clip["sourceEndOffset"].is_number());
        assert!(clip["trackId"].is_string());
        assert_eq!(clip["effects"][1]["type"], "vhs");
    }

    #[test]
    fn test_newer_version_rejected() {
        let state = create_test_state();
        let mut value: Value = serde_json::from_str(&serialize(&state).unwrap()).unwrap();
        value["version"] = json!(PROJECT_FORMAT_VERSION + 1);

        let err = deserialize(&value.to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVersion);
        assert!(matches!(
            err,
            CoreError::UnsupportedVersion { found: 2, supported: 1 }
        ));
    }

    #[test]
    fn test_migrates_v0_document() {
        let legacy = json!({
            "state": {
                "project": { "name": "Legacy" },
                "sources": [],
                "tracks": [
                    { "id": "T1", "type": "video", "name": "Video 1", "order": 0,
                      "muted": false, "locked": false, "visible": true }
                ],
                "clips": []
            }
        });

        let state = deserialize(&legacy.to_string()).unwrap();
        assert_eq!(state.meta().name, "Legacy");
        assert_eq!(state.meta().frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(state.meta().aspect_ratio, AspectRatio::Landscape);
        assert_eq!(state.track_count(), 1);
    }

    #[test]
    fn test_dangling_reference_is_corrupted() {
        let state = create_test_state();
        let mut value: Value = serde_json::from_str(&serialize(&state).unwrap()).unwrap();
        value["state"]["sources"] = json!([]);

        let err = deserialize(&value.to_string()).unwrap_err();
        assert!(matches!(err, CoreError::ProjectCorrupted(_)));
    }

    #[test]
    fn test_duration_recomputed_on_load() {
        let state = create_test_state();
        let mut value: Value = serde_json::from_str(&serialize(&state).unwrap()).unwrap();
        value["state"]["project"]["duration"] = json!(999.0);

        let restored = deserialize(&value.to_string()).unwrap();
        assert_eq!(restored.duration(), state.duration());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = default_path(temp_dir.path());
        let mut state = create_test_state();
        assert!(state.is_dirty);

        save(&path, &mut state).unwrap();
        assert!(!state.is_dirty);
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.clip_count(), 2);
        assert_eq!(loaded.meta().name, "Round Trip");
        assert!(loaded.check_invariants().is_empty());
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = default_path(temp_dir.path());
        // A directory in the way makes the final rename fail
        fs::create_dir(&path).unwrap();
        let mut state = create_test_state();

        assert!(save(&path, &mut state).is_err());
        assert!(!path.with_extension("json.tmp").exists());
        assert!(state.is_dirty);
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let result = load(&temp_dir.path().join("missing.reelsmith.json"));
        assert!(matches!(result, Err(CoreError::ProjectNotFound(_))));
    }
}
