//! `reelsmith timeline ...`

use anyhow::{anyhow, bail, Result};
use clap::Subcommand;
use reelsmith_core::commands::{
    AddClipCommand, AddEffectCommand, AddSourceCommand, AddTrackCommand, DuplicateClipCommand,
    MoveClipCommand, RemoveClipCommand, SplitClipCommand, TrimClipCommand,
};
use reelsmith_core::project::ProjectState;
use reelsmith_core::timeline::{
    Clip, ClipSpec, EffectSpec, EffectType, Source, SourceSpec, Track, TrackKind, TrackSpec,
};
use reelsmith_core::{MediaType, TimeSec};
use serde::Serialize;

use super::{display_name, execute_creating, format_time, parse_params, Context};

#[derive(Subcommand, Debug)]
pub enum TimelineCommand {
    /// Register a media source
    AddSource {
        /// Path or URL of the media
        url: String,

        #[arg(long)]
        name: Option<String>,

        /// video, audio or image (guessed from the extension by default)
        #[arg(long = "type")]
        media_type: Option<MediaType>,

        /// Source length in seconds
        #[arg(long)]
        duration: Option<TimeSec>,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },

    /// Place a source on a track
    AddClip {
        source_id: String,

        /// Target track (default: first track matching the source media)
        #[arg(long)]
        track: Option<String>,

        /// Timeline position in seconds
        #[arg(long, default_value_t = 0.0)]
        start: TimeSec,

        #[arg(long)]
        duration: Option<TimeSec>,

        /// In-point within the source
        #[arg(long)]
        offset: Option<TimeSec>,
    },

    /// Add a video or audio track
    AddTrack {
        kind: TrackKind,

        #[arg(long)]
        name: Option<String>,
    },

    /// Apply an effect to a clip
    AddEffect {
        clip_id: String,

        /// fadeIn, fadeOut, blur, brightness, contrast, saturation, speed, volume, ...
        effect_type: String,

        /// Offset within the clip
        #[arg(long)]
        start: Option<TimeSec>,

        #[arg(long)]
        duration: Option<TimeSec>,

        /// Effect parameter as key=value (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Change a clip's in-point and/or duration
    Trim {
        clip_id: String,

        #[arg(long)]
        start_offset: Option<TimeSec>,

        #[arg(long)]
        duration: Option<TimeSec>,
    },

    /// Cut a clip in two at a timeline position
    Split { clip_id: String, time: TimeSec },

    /// Copy a clip (default: right after the original)
    Duplicate {
        clip_id: String,

        #[arg(long)]
        start: Option<TimeSec>,
    },

    /// Remove clips; fails if any id is unknown
    Delete {
        #[arg(required = true)]
        clip_ids: Vec<String>,
    },

    /// Move a clip to a new position and optionally another track
    Move {
        clip_id: String,

        #[arg(long)]
        track: Option<String>,

        start: TimeSec,
    },

    /// Show sources, tracks and clips
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(ctx: &Context, command: TimelineCommand) -> Result<()> {
    match command {
        TimelineCommand::AddSource {
            url,
            name,
            media_type,
            duration,
            width,
            height,
        } => {
            let media_type = media_type.unwrap_or_else(|| MediaType::from_locator(&url));
            let name = name.unwrap_or_else(|| display_name(&url));
            let spec = SourceSpec::new(&name, media_type, &url)
                .with_duration(duration.unwrap_or(0.0))
                .with_size(width.unwrap_or(0), height.unwrap_or(0));

            let id = ctx.edit(|state, executor| {
                execute_creating(executor, state, AddSourceCommand::new(spec))
            })?;
            println!("Added {} source '{}': {}", media_type, name, id);
            Ok(())
        }

        TimelineCommand::AddClip {
            source_id,
            track,
            start,
            duration,
            offset,
        } => ctx.edit(|state, executor| {
            let track_id = match track {
                Some(track) => track,
                None => default_track_for(state, &source_id)?,
            };
            let mut spec = ClipSpec::new(&source_id, &track_id, start);
            if let Some(duration) = duration {
                spec = spec.with_duration(duration);
            }
            if let Some(offset) = offset {
                spec = spec.with_offset(offset);
            }

            let id = execute_creating(executor, state, AddClipCommand::new(spec))?;
            println!("Added clip {} on track {}", id, track_id);
            Ok(())
        }),

        TimelineCommand::AddTrack { kind, name } => {
            let mut spec = TrackSpec::new(kind);
            if let Some(name) = &name {
                spec = spec.named(name);
            }
            let id = ctx.edit(|state, executor| {
                execute_creating(executor, state, AddTrackCommand::new(spec))
            })?;
            println!("Added {} track {}", kind, id);
            Ok(())
        }

        TimelineCommand::AddEffect {
            clip_id,
            effect_type,
            start,
            duration,
            params,
        } => {
            let effect_type = EffectType::from(effect_type);
            let mut spec = EffectSpec::new(effect_type.clone());
            spec.start_time = start;
            spec.duration = duration;
            spec.params = parse_params(&params)?;

            let id = ctx.edit(|state, executor| {
                execute_creating(executor, state, AddEffectCommand::new(&clip_id, spec))
            })?;
            println!("Applied {} to clip {}: {}", effect_type, clip_id, id);
            Ok(())
        }

        TimelineCommand::Trim {
            clip_id,
            start_offset,
            duration,
        } => {
            if start_offset.is_none() && duration.is_none() {
                bail!("nothing to trim; pass --start-offset and/or --duration");
            }
            let mut command = TrimClipCommand::new(&clip_id);
            if let Some(offset) = start_offset {
                command = command.with_start_offset(offset);
            }
            if let Some(duration) = duration {
                command = command.with_duration(duration);
            }

            ctx.edit(|state, executor| {
                executor.execute(Box::new(command), state)?;
                print_clip(state, &clip_id);
                Ok(())
            })
        }

        TimelineCommand::Split { clip_id, time } => ctx.edit(|state, executor| {
            let second =
                execute_creating(executor, state, SplitClipCommand::new(&clip_id, time))?;
            println!("Split clip {} at {}", clip_id, format_time(time));
            print_clip(state, &clip_id);
            print_clip(state, &second);
            Ok(())
        }),

        TimelineCommand::Duplicate { clip_id, start } => ctx.edit(|state, executor| {
            let id =
                execute_creating(executor, state, DuplicateClipCommand::new(&clip_id, start))?;
            println!("Duplicated clip {} as {}", clip_id, id);
            Ok(())
        }),

        TimelineCommand::Delete { clip_ids } => ctx.edit(|state, executor| {
            for clip_id in &clip_ids {
                executor.execute(Box::new(RemoveClipCommand::new(clip_id)), state)?;
            }
            println!("Deleted {} clip(s)", clip_ids.len());
            Ok(())
        }),

        TimelineCommand::Move {
            clip_id,
            track,
            start,
        } => ctx.edit(|state, executor| {
            let track_id = match track {
                Some(track) => track,
                None => state
                    .clip(&clip_id)
                    .map(|c| c.track_id.clone())
                    .ok_or_else(|| anyhow!("Clip not found: {}", clip_id))?,
            };
            executor.execute(
                Box::new(MoveClipCommand::new(&clip_id, &track_id, start)),
                state,
            )?;
            print_clip(state, &clip_id);
            Ok(())
        }),

        TimelineCommand::List { json } => {
            let state = ctx.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing(&state))?);
            } else {
                print_listing(&state);
            }
            Ok(())
        }
    }
}

/// First track whose kind matches the source's media
pub(crate) fn default_track_for(state: &ProjectState, source_id: &str) -> Result<String> {
    let source = state
        .source(source_id)
        .ok_or_else(|| anyhow!("Missing source reference: {}", source_id))?;
    let kind = TrackKind::for_media(source.media_type);
    state
        .first_track_of(kind)
        .map(|t| t.id.clone())
        .ok_or_else(|| {
            anyhow!(
                "project has no {} track; add one with `timeline add-track {}`",
                kind,
                kind
            )
        })
}

fn print_clip(state: &ProjectState, clip_id: &str) {
    if let Some(clip) = state.clip(clip_id) {
        println!(
            "  {} [{} - {}] source {}..{}",
            clip.id,
            format_time(clip.start_time),
            format_time(clip.end_time()),
            format_time(clip.source_start_offset),
            format_time(clip.source_end_offset)
        );
    }
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackListing<'a> {
    #[serde(flatten)]
    track: &'a Track,
    clips: Vec<&'a Clip>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing<'a> {
    duration: TimeSec,
    sources: Vec<&'a Source>,
    tracks: Vec<TrackListing<'a>>,
}

fn ordered_tracks(state: &ProjectState) -> Vec<&Track> {
    let mut tracks = state.tracks_by_type(TrackKind::Video);
    tracks.extend(state.tracks_by_type(TrackKind::Audio));
    tracks
}

fn listing(state: &ProjectState) -> Listing<'_> {
    Listing {
        duration: state.duration(),
        sources: state.sources().collect(),
        tracks: ordered_tracks(state)
            .into_iter()
            .map(|track| TrackListing {
                track,
                clips: state.clips_by_track(&track.id),
            })
            .collect(),
    }
}

fn print_listing(state: &ProjectState) {
    println!("{} ({})", state.meta().name, format_time(state.duration()));

    println!("Sources:");
    for source in state.sources() {
        println!(
            "  {} {} '{}' {} ({} clip(s))",
            source.id,
            source.media_type,
            source.name,
            format_time(source.duration),
            state.source_usage(&source.id)
        );
    }

    println!("Tracks:");
    for track in ordered_tracks(state) {
        let mut flags = vec![];
        if track.muted {
            flags.push("muted");
        }
        if track.locked {
            flags.push("locked");
        }
        if !track.visible {
            flags.push("hidden");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!("  {} {} '{}'{}", track.id, track.kind, track.name, flags);

        for clip in state.clips_by_track(&track.id) {
            println!(
                "    {} [{} - {}] {}{}",
                clip.id,
                format_time(clip.start_time),
                format_time(clip.end_time()),
                state
                    .source(&clip.source_id)
                    .map_or(clip.source_id.as_str(), |s| s.name.as_str()),
                if clip.effects.is_empty() {
                    String::new()
                } else {
                    format!(
                        " +{}",
                        clip.effects
                            .iter()
                            .map(|e| e.effect_type.to_string())
                            .collect::<Vec<_>>()
                            .join(",")
                    )
                }
            );
        }
    }
}
