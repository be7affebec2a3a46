//! Project State Module
//!
//! The in-memory project aggregate: metadata plus the canonical entity store.
//! Collections are keyed by id and keep insertion order; all relationship
//! queries are recomputed per call.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    timeline::{Clip, Source, Track, TrackKind},
    AspectRatio, ClipId, SourceId, TimeSec, TrackId,
};

/// Default frame rate for new projects
pub const DEFAULT_FRAME_RATE: u32 = 30;

// =============================================================================
// Project Metadata
// =============================================================================

/// Project metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    /// Project name
    pub name: String,
    /// Output aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Frames per second
    pub frame_rate: u32,
    /// Derived: end of the last clip on the timeline
    pub duration: TimeSec,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last modified timestamp (ISO 8601)
    pub modified_at: String,
}

impl ProjectMeta {
    /// Creates new project metadata
    pub fn new(name: &str) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            name: name.to_string(),
            aspect_ratio: AspectRatio::default(),
            frame_rate: DEFAULT_FRAME_RATE,
            duration: 0.0,
            created_at: now.clone(),
            modified_at: now,
        }
    }

    /// Updates the modified timestamp
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

// =============================================================================
// Project State
// =============================================================================

/// Root aggregate owning every source, track, clip and effect
#[derive(Clone, Debug)]
pub struct ProjectState {
    pub(crate) meta: ProjectMeta,
    pub(crate) sources: IndexMap<SourceId, Source>,
    pub(crate) tracks: IndexMap<TrackId, Track>,
    pub(crate) clips: IndexMap<ClipId, Clip>,
    /// Whether state has unsaved changes
    pub is_dirty: bool,
}

impl ProjectState {
    /// Creates a new project with one video and one audio track
    pub fn new(name: &str) -> Self {
        let mut state = Self::empty(ProjectMeta::new(name));
        for track in [
            Track::new("Video 1", TrackKind::Video, 0),
            Track::new("Audio 1", TrackKind::Audio, 0),
        ] {
            state.tracks.insert(track.id.clone(), track);
        }
        state
    }

    /// Creates a new project with explicit output settings
    pub fn with_format(name: &str, aspect_ratio: AspectRatio, frame_rate: u32) -> Self {
        let mut state = Self::new(name);
        state.meta.aspect_ratio = aspect_ratio;
        state.meta.frame_rate = frame_rate.max(1);
        state
    }

    /// Creates a state without default tracks (used when loading documents)
    pub(crate) fn empty(meta: ProjectMeta) -> Self {
        Self {
            meta,
            sources: IndexMap::new(),
            tracks: IndexMap::new(),
            clips: IndexMap::new(),
            is_dirty: false,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Project metadata
    pub fn meta(&self) -> &ProjectMeta {
        &self.meta
    }

    /// Total duration: max end time over all clips, 0 when empty
    pub fn duration(&self) -> TimeSec {
        self.meta.duration
    }

    pub fn sources(&self) -> impl Iterator<Item = &Source> + '_ {
        self.sources.values()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.values()
    }

    pub fn clips(&self) -> impl Iterator<Item = &Clip> + '_ {
        self.clips.values()
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.get(id)
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub fn clip(&self, id: &str) -> Option<&Clip> {
        self.clips.get(id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Clips on a track ordered by start time (id breaks ties)
    pub fn clips_by_track(&self, track_id: &str) -> Vec<&Clip> {
        let mut clips: Vec<&Clip> = self
            .clips
            .values()
            .filter(|c| c.track_id == track_id)
            .collect();
        clips.sort_by(|a, b| {
            a.start_time
                .total_cmp(&b.start_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        clips
    }

    /// Tracks of one kind in lane order
    pub fn tracks_by_type(&self, kind: TrackKind) -> Vec<&Track> {
        let mut tracks: Vec<&Track> = self.tracks.values().filter(|t| t.kind == kind).collect();
        tracks.sort_by_key(|t| t.order);
        tracks
    }

    /// First track of a kind in lane order
    pub fn first_track_of(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks_by_type(kind).into_iter().next()
    }

    /// Number of clips referencing a source
    pub fn source_usage(&self, source_id: &str) -> usize {
        self.clips
            .values()
            .filter(|c| c.source_id == source_id)
            .count()
    }

    /// Recomputes the derived duration from the clip set
    pub fn compute_duration(&self) -> TimeSec {
        self.clips
            .values()
            .map(|c| c.end_time())
            .fold(0.0, f64::max)
    }

    /// Lists every violated store invariant (empty when consistent)
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.meta.duration != self.compute_duration() {
            problems.push(format!(
                "stale duration {} (expected {})",
                self.meta.duration,
                self.compute_duration()
            ));
        }

        for kind in [TrackKind::Video, TrackKind::Audio] {
            let orders: Vec<u32> = self.tracks_by_type(kind).iter().map(|t| t.order).collect();
            if orders.windows(2).any(|w| w[0] == w[1]) {
                problems.push(format!("duplicate {} track order", kind));
            }
        }

        for clip in self.clips.values() {
            if !self.tracks.contains_key(&clip.track_id) {
                problems.push(format!("clip {} references missing track", clip.id));
            }
            match self.sources.get(&clip.source_id) {
                None => problems.push(format!("clip {} references missing source", clip.id)),
                Some(source) if source.has_duration() => {
                    if clip.source_end_offset > source.duration {
                        problems.push(format!("clip {} ends past its source", clip.id));
                    }
                }
                Some(_) => {}
            }
            if clip.start_time < 0.0 || !(clip.duration > 0.0) {
                problems.push(format!("clip {} has an invalid placement", clip.id));
            }
            if clip.source_start_offset < 0.0
                || clip.source_start_offset >= clip.source_end_offset
            {
                problems.push(format!("clip {} has an invalid source window", clip.id));
            }
        }

        problems
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    /// Recomputes derived fields after a structural mutation
    pub(crate) fn touch(&mut self) {
        self.meta.duration = self.compute_duration();
        self.meta.touch();
        self.is_dirty = true;
    }
}

// =============================================================================
// Tests
// =============================================================================
