//! Project Engine
//!
//! Mutation operations on [`ProjectState`]. Every operation validates first
//! and mutates last, so a failed call leaves the store untouched. Operations
//! aimed at one explicit target return `CoreResult`; batch helpers
//! (`remove_clip`, `add_effect`) report a missing target softly.

use tracing::debug;

use super::ProjectState;
use crate::{
    is_valid_duration, is_valid_time_sec, new_id,
    timeline::{Clip, ClipSpec, Effect, EffectSpec, Source, SourceSpec, Track, TrackSpec},
    AspectRatio, ClipId, CoreError, CoreResult, TimeSec,
};

/// Shortest window a trim may leave behind
pub const MIN_CLIP_DURATION: TimeSec = 0.001;

fn sanitize_len(value: TimeSec) -> TimeSec {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl ProjectState {
    // =========================================================================
    // Sources & Tracks
    // =========================================================================

    /// Adds a source. The locator is stored as given and never resolved.
    pub fn add_source(&mut self, spec: SourceSpec) -> Source {
        let source = Source::new(&spec.name, spec.media_type, &spec.url)
            .with_duration(sanitize_len(spec.duration))
            .with_size(spec.width, spec.height);

        debug!("Adding source {} ({})", source.id, source.url);
        self.sources.insert(source.id.clone(), source.clone());
        self.touch();
        source
    }

    /// Adds a track; the lane order defaults to the number of tracks of that kind
    pub fn add_track(&mut self, spec: TrackSpec) -> Track {
        let siblings = self.tracks_by_type(spec.kind);
        let count = siblings.len() as u32;
        let max_order = siblings.iter().map(|t| t.order).max();

        let mut order = spec.order.unwrap_or(count);
        if siblings.iter().any(|t| t.order == order) {
            order = max_order.map_or(0, |m| m + 1);
        }

        let name = spec.name.unwrap_or_else(|| {
            let prefix = match spec.kind {
                crate::timeline::TrackKind::Video => "Video",
                crate::timeline::TrackKind::Audio => "Audio",
            };
            format!("{} {}", prefix, count + 1)
        });

        let track = Track::new(&name, spec.kind, order);
        debug!("Adding {} track {} at order {}", track.kind, track.id, order);
        self.tracks.insert(track.id.clone(), track.clone());
        self.touch();
        track
    }

    /// Renames a source (the only mutable source metadata)
    pub fn rename_source(&mut self, source_id: &str, name: &str) -> CoreResult<()> {
        let source = self
            .sources
            .get_mut(source_id)
            .ok_or_else(|| CoreError::SourceNotFound(source_id.to_string()))?;
        source.name = name.to_string();
        self.touch();
        Ok(())
    }

    /// Updates track flags; `None` leaves a flag unchanged
    pub fn set_track_flags(
        &mut self,
        track_id: &str,
        muted: Option<bool>,
        locked: Option<bool>,
        visible: Option<bool>,
    ) -> CoreResult<Track> {
        let track = self
            .tracks
            .get_mut(track_id)
            .ok_or_else(|| CoreError::TrackNotFound(track_id.to_string()))?;

        if let Some(m) = muted {
            track.muted = m;
        }
        if let Some(l) = locked {
            track.locked = l;
        }
        if let Some(v) = visible {
            track.visible = v;
        }
        let updated = track.clone();
        self.touch();
        Ok(updated)
    }

    // =========================================================================
    // Project Settings
    // =========================================================================

    pub fn set_name(&mut self, name: &str) {
        self.meta.name = name.to_string();
        self.touch();
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.meta.aspect_ratio = aspect_ratio;
        self.touch();
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) -> CoreResult<()> {
        if frame_rate == 0 {
            return Err(CoreError::ValidationError(
                "frameRate must be a positive integer".to_string(),
            ));
        }
        self.meta.frame_rate = frame_rate;
        self.touch();
        Ok(())
    }

    // =========================================================================
    // Clips
    // =========================================================================

    /// Places a source window on a track.
    ///
    /// An explicit duration running past the end of the source is clamped
    /// to the source end.
    pub fn add_clip(&mut self, spec: ClipSpec) -> CoreResult<Clip> {
        let source =
            self.sources
                .get(&spec.source_id)
                .ok_or_else(|| CoreError::MissingReference {
                    kind: "source",
                    id: spec.source_id.clone(),
                })?;
        if !self.tracks.contains_key(&spec.track_id) {
            return Err(CoreError::MissingReference {
                kind: "track",
                id: spec.track_id.clone(),
            });
        }
        if !is_valid_time_sec(spec.start_time) {
            return Err(CoreError::invalid_range("start time", spec.start_time));
        }

        let offset = spec.source_start_offset.unwrap_or(0.0);
        if !is_valid_time_sec(offset) || (source.has_duration() && offset >= source.duration) {
            return Err(CoreError::invalid_range("source start offset", offset));
        }

        let requested = match spec.duration {
            Some(d) => d,
            None if source.has_duration() => source.duration - offset,
            // Stills have no natural length; the caller must pick one.
            None => return Err(CoreError::invalid_range("duration", 0.0)),
        };
        if !is_valid_duration(requested) {
            return Err(CoreError::invalid_range("duration", requested));
        }

        let mut end = offset + requested;
        if source.has_duration() && end > source.duration {
            debug!(
                "Clamping clip window {}..{} to source duration {}",
                offset, end, source.duration
            );
            end = source.duration;
        }

        let clip = Clip::new(
            &spec.source_id,
            &spec.track_id,
            spec.start_time,
            offset,
            end,
        );
        debug!(
            "Adding clip {} on track {} at {}s ({}s)",
            clip.id, clip.track_id, clip.start_time, clip.duration
        );
        self.clips.insert(clip.id.clone(), clip.clone());
        self.touch();
        Ok(clip)
    }

    /// Moves the in-point, keeping the out-point and timeline position
    pub fn trim_clip_start(&mut self, clip_id: &str, new_start_offset: TimeSec) -> CoreResult<Clip> {
        if !new_start_offset.is_finite() {
            return Err(CoreError::invalid_range("source start offset", new_start_offset));
        }
        let clip = self
            .clips
            .get_mut(clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;

        let end = clip.source_end_offset;
        let upper = (end - MIN_CLIP_DURATION).max(0.0);
        let start = new_start_offset.clamp(0.0, upper);

        clip.source_start_offset = start;
        clip.duration = end - start;
        let updated = clip.clone();

        debug!(
            "Trimmed start of clip {} to {}s (duration {}s)",
            clip_id, start, updated.duration
        );
        self.touch();
        Ok(updated)
    }

    /// Sets the clip duration by moving the out-point
    pub fn trim_clip_end(&mut self, clip_id: &str, new_duration: TimeSec) -> CoreResult<Clip> {
        if !is_valid_duration(new_duration) {
            return Err(CoreError::invalid_range("duration", new_duration));
        }
        let clip = self
            .clips
            .get(clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;

        let mut end = clip.source_start_offset + new_duration;
        if let Some(source) = self.sources.get(&clip.source_id) {
            if source.has_duration() {
                end = end.min(source.duration);
            }
        }
        let duration = end - clip.source_start_offset;
        if !is_valid_duration(duration) {
            return Err(CoreError::invalid_range("duration", duration));
        }

        let clip = self
            .clips
            .get_mut(clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;
        clip.source_end_offset = end;
        clip.duration = duration;
        let updated = clip.clone();

        debug!("Trimmed end of clip {} to {}s", clip_id, duration);
        self.touch();
        Ok(updated)
    }

    /// Splits a clip at an absolute timeline time.
    ///
    /// The first half keeps the original id; the second half gets a new id and
    /// is returned second. Each effect goes to the half containing its start.
    pub fn split_clip(&mut self, clip_id: &str, at: TimeSec) -> CoreResult<(ClipId, ClipId)> {
        let index = self
            .clips
            .get_index_of(clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;
        let original = self.clips[index].clone();

        if !at.is_finite() || !original.contains_strictly(at) {
            return Err(CoreError::InvalidSplitPoint(at));
        }

        let delta = at - original.start_time;
        let split_offset = original.source_start_offset + delta;

        let mut first = original.clone();
        first.duration = delta;
        first.source_end_offset = split_offset;

        let mut second = original.clone();
        second.id = new_id();
        second.start_time = at;
        second.duration = original.duration - delta;
        second.source_start_offset = split_offset;

        let (head, tail): (Vec<Effect>, Vec<Effect>) = original
            .effects
            .into_iter()
            .partition(|e| e.start_time < delta);

        first.effects = head
            .into_iter()
            .map(|mut e| {
                let limit = delta - e.start_time;
                if limit > 0.0 {
                    e.duration = e.duration.min(limit);
                }
                e
            })
            .collect();
        second.effects = tail
            .into_iter()
            .map(|mut e| {
                e.start_time -= delta;
                let limit = second.duration - e.start_time;
                if limit > 0.0 {
                    e.duration = e.duration.min(limit);
                }
                e
            })
            .collect();

        let first_id = first.id.clone();
        let second_id = second.id.clone();
        debug!(
            "Split clip {} at {}s into {} + {}",
            clip_id, at, first_id, second_id
        );

        self.clips[index] = first;
        self.clips.shift_insert(index + 1, second_id.clone(), second);
        self.touch();
        Ok((first_id, second_id))
    }

    /// Clones a clip (and its effects) under new ids on the same track
    pub fn duplicate_clip(&mut self, clip_id: &str, new_start: Option<TimeSec>) -> CoreResult<Clip> {
        let original = self
            .clips
            .get(clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;

        let start = new_start.unwrap_or_else(|| original.end_time());
        if !is_valid_time_sec(start) {
            return Err(CoreError::invalid_range("start time", start));
        }

        let mut copy = original.clone();
        copy.id = new_id();
        copy.start_time = start;
        for effect in &mut copy.effects {
            effect.id = new_id();
        }

        debug!("Duplicated clip {} as {} at {}s", clip_id, copy.id, start);
        self.clips.insert(copy.id.clone(), copy.clone());
        self.touch();
        Ok(copy)
    }

    /// Reassigns a clip's track and timeline position; overlaps are allowed
    pub fn move_clip(
        &mut self,
        clip_id: &str,
        new_track_id: &str,
        new_start: TimeSec,
    ) -> CoreResult<Clip> {
        if !self.clips.contains_key(clip_id) {
            return Err(CoreError::ClipNotFound(clip_id.to_string()));
        }
        let track = self
            .tracks
            .get(new_track_id)
            .ok_or_else(|| CoreError::MissingReference {
                kind: "track",
                id: new_track_id.to_string(),
            })?;
        if !is_valid_time_sec(new_start) {
            return Err(CoreError::invalid_range("start time", new_start));
        }
        let track_kind = track.kind;

        let media_kind = self.clips.get(clip_id).and_then(|c| {
            self.sources
                .get(&c.source_id)
                .map(|s| crate::timeline::TrackKind::for_media(s.media_type))
        });
        if media_kind.is_some_and(|k| k != track_kind) {
            debug!(
                "Clip {} moved onto a {} track holding other media",
                clip_id, track_kind
            );
        }

        let clip = self
            .clips
            .get_mut(clip_id)
            .ok_or_else(|| CoreError::ClipNotFound(clip_id.to_string()))?;
        clip.track_id = new_track_id.to_string();
        clip.start_time = new_start;
        let updated = clip.clone();

        debug!("Moved clip {} to track {} at {}s", clip_id, new_track_id, new_start);
        self.touch();
        Ok(updated)
    }

    /// Removes a clip and its effects. Returns false when the id is unknown.
    pub fn remove_clip(&mut self, clip_id: &str) -> bool {
        self.take_clip(clip_id).is_some()
    }

    /// Appends an effect to a clip. Returns `None` when the clip is unknown.
    pub fn add_effect(&mut self, clip_id: &str, spec: EffectSpec) -> Option<Effect> {
        let clip = self.clips.get_mut(clip_id)?;

        let start = spec
            .start_time
            .filter(|t| is_valid_time_sec(*t))
            .unwrap_or(0.0);
        let duration = spec
            .duration
            .filter(|d| is_valid_duration(*d))
            .unwrap_or(clip.duration);

        let mut effect = Effect::new(spec.effect_type, start, duration);
        effect.params = spec.params;
        clip.effects.push(effect.clone());

        debug!(
            "Added {} effect {} to clip {}",
            effect.effect_type, effect.id, clip_id
        );
        self.touch();
        Some(effect)
    }

    /// Detaches an effect from a clip
    pub fn remove_effect(&mut self, clip_id: &str, effect_id: &str) -> Option<Effect> {
        let clip = self.clips.get_mut(clip_id)?;
        let pos = clip.effects.iter().position(|e| e.id == effect_id)?;
        let effect = clip.effects.remove(pos);
        self.touch();
        Some(effect)
    }

    // =========================================================================
    // Raw Access (undo support)
    // =========================================================================

    /// Removes a clip, returning its former position
    pub(crate) fn take_clip(&mut self, clip_id: &str) -> Option<(usize, Clip)> {
        let (index, _, clip) = self.clips.shift_remove_full(clip_id)?;
        debug!("Removed clip {}", clip_id);
        self.touch();
        Some((index, clip))
    }

    /// Re-inserts a clip at a position (clamped to the collection length)
    pub(crate) fn restore_clip(&mut self, index: usize, clip: Clip) {
        let index = index.min(self.clips.len());
        self.clips.shift_insert(index, clip.id.clone(), clip);
        self.touch();
    }

    /// Overwrites an existing clip in place
    pub(crate) fn replace_clip(&mut self, clip: Clip) -> CoreResult<()> {
        let slot = self
            .clips
            .get_mut(&clip.id)
            .ok_or_else(|| CoreError::ClipNotFound(clip.id.clone()))?;
        *slot = clip;
        self.touch();
        Ok(())
    }

    pub(crate) fn take_track(&mut self, track_id: &str) -> Option<Track> {
        let track = self.tracks.shift_remove(track_id)?;
        self.touch();
        Some(track)
    }

    pub(crate) fn restore_track(&mut self, track: Track) {
        self.tracks.insert(track.id.clone(), track);
        self.touch();
    }

    pub(crate) fn take_source(&mut self, source_id: &str) -> Option<Source> {
        let source = self.sources.shift_remove(source_id)?;
        self.touch();
        Some(source)
    }

    pub(crate) fn restore_source(&mut self, source: Source) {
        self.sources.insert(source.id.clone(), source);
        self.touch();
    }

    pub(crate) fn clip_index(&self, clip_id: &str) -> Option<usize> {
        self.clips.get_index_of(clip_id)
    }

    pub(crate) fn restore_effect(&mut self, clip_id: &str, index: usize, effect: Effect) -> bool {
        let Some(clip) = self.clips.get_mut(clip_id) else {
            return false;
        };
        let index = index.min(clip.effects.len());
        clip.effects.insert(index, effect);
        self.touch();
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        timeline::{EffectType, TrackKind},
        ErrorKind, MediaType,
    };

    fn create_test_state() -> (ProjectState, String, String) {
        let mut state = ProjectState::new("Test Project");
        let track_id = state.add_track(TrackSpec::new(TrackKind::Video)).id;
        let source_id = state
            .add_source(SourceSpec::new("clip.mp4", MediaType::Video, "/clip.mp4").with_duration(10.0))
            .id;
        (state, track_id, source_id)
    }

    fn add_full_clip(state: &mut ProjectState, track_id: &str, source_id: &str) -> Clip {
        state
            .add_clip(ClipSpec::new(source_id, track_id, 0.0).with_duration(10.0))
            .unwrap()
    }

    fn assert_duration_invariant(state: &ProjectState) {
        assert_eq!(state.duration(), state.compute_duration());
    }

    #[test]
    fn test_add_track_assigns_order() {
        let mut state = ProjectState::new("Demo");
        let second = state.add_track(TrackSpec::new(TrackKind::Video));
        let third = state.add_track(TrackSpec::new(TrackKind::Video).named("B-roll"));

        assert_eq!(second.order, 1);
        assert_eq!(second.name, "Video 2");
        assert_eq!(third.order, 2);
        assert_eq!(third.name, "B-roll");
    }

    #[test]
    fn test_add_track_bumps_colliding_order() {
        let mut state = ProjectState::new("Demo");
        let track = state.add_track(TrackSpec::new(TrackKind::Audio).at_order(0));

        assert_eq!(track.order, 1);
        assert!(state.check_invariants().is_empty());
    }

    #[test]
    fn test_add_source_sanitizes_duration() {
        let mut state = ProjectState::new("Demo");
        let source = state.add_source(
            SourceSpec::new("still", MediaType::Image, "a.png").with_duration(f64::NAN),
        );
        assert_eq!(source.duration, 0.0);
        assert!(!source.has_duration());
    }

    #[test]
    fn test_add_clip_scenario_duration() {
        let (mut state, track_id, source_id) = create_test_state();
        add_full_clip(&mut state, &track_id, &source_id);

        assert_eq!(state.duration(), 10.0);
        assert_duration_invariant(&state);
    }

    #[test]
    fn test_add_clip_defaults_duration_from_source() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = state
            .add_clip(ClipSpec::new(&source_id, &track_id, 2.0).with_offset(3.0))
            .unwrap();

        assert_eq!(clip.duration, 7.0);
        assert_eq!(clip.source_start_offset, 3.0);
        assert_eq!(clip.source_end_offset, 10.0);
        assert_eq!(state.duration(), 9.0);
    }

    #[test]
    fn test_add_clip_clamps_to_source() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = state
            .add_clip(ClipSpec::new(&source_id, &track_id, 0.0).with_duration(25.0))
            .unwrap();

        assert_eq!(clip.duration, 10.0);
        assert_eq!(clip.source_end_offset, 10.0);
    }

    #[test]
    fn test_add_clip_unknown_source_is_reference_error() {
        let (mut state, track_id, _) = create_test_state();
        let before = state.clip_count();

        let err = state
            .add_clip(ClipSpec::new("nonexistent", &track_id, 0.0))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Reference);
        assert_eq!(state.clip_count(), before);
    }

    #[test]
    fn test_add_clip_unknown_track_is_reference_error() {
        let (mut state, _, source_id) = create_test_state();
        let err = state
            .add_clip(ClipSpec::new(&source_id, "nope", 0.0))
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingReference { kind: "track", .. }));
        assert_eq!(state.clip_count(), 0);
    }

    #[test]
    fn test_add_clip_still_image_needs_duration() {
        let mut state = ProjectState::new("Demo");
        let track_id = state.first_track_of(TrackKind::Video).unwrap().id.clone();
        let still = state.add_source(SourceSpec::new("cover", MediaType::Image, "cover.png"));

        let err = state
            .add_clip(ClipSpec::new(&still.id, &track_id, 0.0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);

        let clip = state
            .add_clip(ClipSpec::new(&still.id, &track_id, 1.0).with_duration(3.0))
            .unwrap();
        assert_eq!(clip.duration, 3.0);
        assert_eq!(state.duration(), 4.0);
    }

    #[test]
    fn test_add_clip_rejects_bad_offsets() {
        let (mut state, track_id, source_id) = create_test_state();

        assert!(state
            .add_clip(ClipSpec::new(&source_id, &track_id, -1.0))
            .is_err());
        assert!(state
            .add_clip(ClipSpec::new(&source_id, &track_id, 0.0).with_offset(10.0))
            .is_err());
        assert!(state
            .add_clip(ClipSpec::new(&source_id, &track_id, 0.0).with_duration(0.0))
            .is_err());
        assert_eq!(state.clip_count(), 0);
    }

    #[test]
    fn test_trim_clip_end_scenario() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        let trimmed = state.trim_clip_end(&clip.id, 3.0).unwrap();

        assert_eq!(trimmed.duration, 3.0);
        assert_eq!(trimmed.source_end_offset, 3.0);
        assert_eq!(state.duration(), 3.0);
    }

    #[test]
    fn test_trim_clip_end_clamps_to_source() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = state
            .add_clip(ClipSpec::new(&source_id, &track_id, 0.0).with_offset(4.0))
            .unwrap();

        let trimmed = state.trim_clip_end(&clip.id, 50.0).unwrap();
        assert_eq!(trimmed.source_end_offset, 10.0);
        assert_eq!(trimmed.duration, 6.0);
    }

    #[test]
    fn test_trim_clip_end_rejects_non_positive() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        for bad in [0.0, -2.0, f64::NAN] {
            let err = state.trim_clip_end(&clip.id, bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRange);
        }
        assert_eq!(state.clip(&clip.id).unwrap().duration, 10.0);
    }

    #[test]
    fn test_trim_clip_start_clamps() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        let trimmed = state.trim_clip_start(&clip.id, 2.5).unwrap();
        assert_eq!(trimmed.source_start_offset, 2.5);
        assert_eq!(trimmed.duration, 7.5);
        assert_eq!(trimmed.start_time, 0.0);

        let low = state.trim_clip_start(&clip.id, -4.0).unwrap();
        assert_eq!(low.source_start_offset, 0.0);
        assert_eq!(low.duration, 10.0);

        let high = state.trim_clip_start(&clip.id, 99.0).unwrap();
        assert!(high.source_start_offset < high.source_end_offset);
        assert!(high.duration > 0.0);
        assert_duration_invariant(&state);
    }

    #[test]
    fn test_trim_unknown_clip_is_not_found() {
        let (mut state, _, _) = create_test_state();
        assert_eq!(
            state.trim_clip_start("missing", 1.0).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            state.trim_clip_end("missing", 1.0).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_split_clip_scenario() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        let (first_id, second_id) = state.split_clip(&clip.id, 4.0).unwrap();
        let first = state.clip(&first_id).unwrap();
        let second = state.clip(&second_id).unwrap();

        assert_eq!(first_id, clip.id);
        assert_eq!(first.start_time, clip.start_time);
        assert_eq!(second.start_time, 4.0);
        assert_eq!(first.duration, 4.0);
        assert_eq!(second.duration, 6.0);
        assert_eq!(first.duration + second.duration, clip.duration);
        assert_eq!(first.source_end_offset, second.source_start_offset);
        assert_eq!(state.duration(), 10.0);
        assert_eq!(state.clip_count(), 2);
    }

    #[test]
    fn test_split_clip_with_offset_and_position() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = state
            .add_clip(ClipSpec::new(&source_id, &track_id, 5.0).with_offset(2.0))
            .unwrap();

        let (a, b) = state.split_clip(&clip.id, 7.0).unwrap();
        let a = state.clip(&a).unwrap();
        let b = state.clip(&b).unwrap();

        assert_eq!(a.source_start_offset, 2.0);
        assert_eq!(a.source_end_offset, 4.0);
        assert_eq!(b.source_start_offset, 4.0);
        assert_eq!(b.source_end_offset, 10.0);
        assert_eq!(b.duration, 6.0);
    }

    #[test]
    fn test_split_partitions_effects() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        let fade_in = state
            .add_effect(&clip.id, EffectSpec::new(EffectType::FadeIn).window(0.0, 1.0))
            .unwrap();
        let straddling = state
            .add_effect(&clip.id, EffectSpec::new(EffectType::Blur).window(3.0, 3.0))
            .unwrap();
        let fade_out = state
            .add_effect(&clip.id, EffectSpec::new(EffectType::FadeOut).window(9.0, 1.0))
            .unwrap();

        let (a, b) = state.split_clip(&clip.id, 4.0).unwrap();
        let a = state.clip(&a).unwrap();
        let b = state.clip(&b).unwrap();

        let a_ids: Vec<&str> = a.effects.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(a_ids, vec![fade_in.id.as_str(), straddling.id.as_str()]);
        assert_eq!(a.effects[1].duration, 1.0);

        assert_eq!(b.effects.len(), 1);
        assert_eq!(b.effects[0].id, fade_out.id);
        assert_eq!(b.effects[0].start_time, 5.0);
    }

    #[test]
    fn test_split_out_of_bounds() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        for at in [0.0, 10.0, 12.0, -1.0] {
            let err = state.split_clip(&clip.id, at).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRange);
        }
        assert_eq!(state.clip_count(), 1);
        assert_eq!(
            state.split_clip("missing", 1.0).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_duplicate_clip_defaults_after_original() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);
        let effect = state
            .add_effect(&clip.id, EffectSpec::new(EffectType::FadeIn))
            .unwrap();

        let copy = state.duplicate_clip(&clip.id, None).unwrap();

        assert_ne!(copy.id, clip.id);
        assert_eq!(copy.start_time, 10.0);
        assert_eq!(copy.track_id, track_id);
        assert_eq!(copy.effects.len(), 1);
        assert_ne!(copy.effects[0].id, effect.id);
        assert_eq!(state.duration(), 20.0);

        let placed = state.duplicate_clip(&clip.id, Some(3.0)).unwrap();
        assert_eq!(placed.start_time, 3.0);
    }

    #[test]
    fn test_move_clip_allows_overlap() {
        let (mut state, track_id, source_id) = create_test_state();
        let a = add_full_clip(&mut state, &track_id, &source_id);
        let other_track = state.add_track(TrackSpec::new(TrackKind::Video)).id;
        let b = state
            .add_clip(ClipSpec::new(&source_id, &other_track, 0.0))
            .unwrap();

        let moved = state.move_clip(&b.id, &track_id, 5.0).unwrap();

        assert_eq!(moved.track_id, track_id);
        assert_eq!(moved.start_time, 5.0);
        assert_eq!(state.clips_by_track(&track_id).len(), 2);
        assert_eq!(state.clips_by_track(&track_id)[0].id, a.id);
        assert_eq!(state.duration(), 15.0);
    }

    #[test]
    fn test_move_clip_missing_target_track() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        let err = state.move_clip(&clip.id, "nowhere", 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert_eq!(state.clip(&clip.id).unwrap().track_id, track_id);
    }

    #[test]
    fn test_remove_clip_soft_fail_idempotence() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        assert!(state.remove_clip(&clip.id));
        assert!(!state.remove_clip(&clip.id));
        assert_eq!(state.duration(), 0.0);
        // Source stays behind, orphaned
        assert!(state.source(&source_id).is_some());
        assert_eq!(state.source_usage(&source_id), 0);
    }

    #[test]
    fn test_add_effect_soft_fail() {
        let (mut state, _, _) = create_test_state();
        assert!(state
            .add_effect("missing", EffectSpec::new(EffectType::Blur))
            .is_none());
    }

    #[test]
    fn test_add_effect_defaults_window() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);

        let effect = state
            .add_effect(
                &clip.id,
                EffectSpec {
                    effect_type: EffectType::Blur,
                    start_time: Some(-3.0),
                    duration: Some(0.0),
                    params: Default::default(),
                },
            )
            .unwrap();

        assert_eq!(effect.start_time, 0.0);
        assert_eq!(effect.duration, 10.0);
        assert_eq!(state.clip(&clip.id).unwrap().effects.len(), 1);
    }

    #[test]
    fn test_set_frame_rate_rejects_zero() {
        let mut state = ProjectState::new("Demo");
        assert!(state.set_frame_rate(0).is_err());
        state.set_frame_rate(60).unwrap();
        assert_eq!(state.meta().frame_rate, 60);
    }

    #[test]
    fn test_set_track_flags() {
        let mut state = ProjectState::new("Demo");
        let track_id = state.first_track_of(TrackKind::Audio).unwrap().id.clone();

        let track = state
            .set_track_flags(&track_id, Some(true), None, Some(false))
            .unwrap();
        assert!(track.muted);
        assert!(!track.locked);
        assert!(!track.visible);
        assert!(state.set_track_flags("nope", None, None, None).is_err());
    }

    #[test]
    fn test_duration_invariant_through_mutations() {
        let (mut state, track_id, source_id) = create_test_state();
        let clip = add_full_clip(&mut state, &track_id, &source_id);
        assert_duration_invariant(&state);

        let copy = state.duplicate_clip(&clip.id, None).unwrap();
        assert_duration_invariant(&state);

        state.split_clip(&copy.id, 15.0).unwrap();
        assert_duration_invariant(&state);

        state.move_clip(&clip.id, &track_id, 30.0).unwrap();
        assert_duration_invariant(&state);
        assert_eq!(state.duration(), 40.0);

        state.remove_clip(&clip.id);
        assert_duration_invariant(&state);
        assert_eq!(state.duration(), 20.0);
        assert!(state.check_invariants().is_empty());
    }
}
