//! `reelsmith batch ...`
//!
//! Bulk helpers. Unlike the single-target timeline commands these skip ids
//! that don't resolve and report how many items went through.

use anyhow::{bail, Result};
use clap::Subcommand;
use reelsmith_core::commands::{AddClipCommand, AddEffectCommand, AddSourceCommand, RemoveClipCommand};
use reelsmith_core::project::ProjectState;
use reelsmith_core::timeline::{ClipSpec, EffectSpec, EffectType, SourceSpec};
use reelsmith_core::{MediaType, TimeSec};
use tracing::warn;

use super::timeline::default_track_for;
use super::{display_name, execute_creating, format_time, parse_params, Context};

#[derive(Subcommand, Debug)]
pub enum BatchCommand {
    /// Register several media files as sources
    Import {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Media type for every file (guessed per file by default)
        #[arg(long = "type")]
        media_type: Option<MediaType>,

        /// Duration for every file in seconds
        #[arg(long)]
        duration: Option<TimeSec>,
    },

    /// Append one clip per source, back to back, after the track's last clip
    Concat {
        #[arg(required = true)]
        source_ids: Vec<String>,

        /// Target track (default: first track matching the first source)
        #[arg(long)]
        track: Option<String>,
    },

    /// Apply the same effect to several clips
    ApplyEffect {
        effect_type: String,

        #[arg(required = true)]
        clip_ids: Vec<String>,

        /// Effect parameter as key=value (repeatable)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Remove several clips, ignoring unknown ids
    RemoveClips {
        #[arg(required = true)]
        clip_ids: Vec<String>,
    },
}

pub fn run(ctx: &Context, command: BatchCommand) -> Result<()> {
    match command {
        BatchCommand::Import {
            paths,
            media_type,
            duration,
        } => ctx.edit(|state, executor| {
            for path in &paths {
                let media_type = media_type.unwrap_or_else(|| MediaType::from_locator(path));
                let spec = SourceSpec::new(&display_name(path), media_type, path)
                    .with_duration(duration.unwrap_or(0.0));
                let id = execute_creating(executor, state, AddSourceCommand::new(spec))?;
                println!("{} {} {}", id, media_type, path);
            }
            println!("Imported {} source(s)", paths.len());
            Ok(())
        }),

        BatchCommand::Concat { source_ids, track } => ctx.edit(|state, executor| {
            let track_id = match (track, source_ids.first()) {
                (Some(track), _) => track,
                (None, Some(first)) => default_track_for(state, first)?,
                (None, None) => bail!("no sources given"),
            };
            let mut cursor = track_end(state, &track_id);
            let mut placed = 0;

            for source_id in &source_ids {
                let spec = ClipSpec::new(source_id, &track_id, cursor);
                match execute_creating(executor, state, AddClipCommand::new(spec)) {
                    Ok(clip_id) => {
                        if let Some(clip) = state.clip(&clip_id) {
                            println!(
                                "{} [{} - {}]",
                                clip_id,
                                format_time(clip.start_time),
                                format_time(clip.end_time())
                            );
                            cursor = clip.end_time();
                        }
                        placed += 1;
                    }
                    Err(e) => warn!("Skipping source {}: {:#}", source_id, e),
                }
            }

            println!("Placed {}/{} clips", placed, source_ids.len());
            if placed == 0 {
                bail!("no clips were placed");
            }
            Ok(())
        }),

        BatchCommand::ApplyEffect {
            effect_type,
            clip_ids,
            params,
        } => {
            let mut spec = EffectSpec::new(EffectType::from(effect_type));
            spec.params = parse_params(&params)?;
            if let Err(e) = spec.effect_type.validate_params(&spec.params) {
                bail!("invalid parameters for {}: {}", spec.effect_type, e);
            }

            ctx.edit(|state, executor| {
                let mut applied = 0;
                for clip_id in &clip_ids {
                    let command = AddEffectCommand::new(clip_id, spec.clone());
                    match executor.execute(Box::new(command), state) {
                        Ok(_) => applied += 1,
                        Err(e) => warn!("Skipping clip {}: {}", clip_id, e),
                    }
                }
                println!(
                    "Applied {} to {}/{} clips",
                    spec.effect_type,
                    applied,
                    clip_ids.len()
                );
                Ok(())
            })
        }

        BatchCommand::RemoveClips { clip_ids } => ctx.edit(|state, executor| {
            let mut removed = 0;
            for clip_id in &clip_ids {
                if state.clip(clip_id).is_none() {
                    warn!("Skipping unknown clip {}", clip_id);
                    continue;
                }
                executor.execute(Box::new(RemoveClipCommand::new(clip_id)), state)?;
                removed += 1;
            }
            println!("Removed {}/{} clips", removed, clip_ids.len());
            Ok(())
        }),
    }
}

/// End of the last clip on a track, 0 when empty
fn track_end(state: &ProjectState, track_id: &str) -> TimeSec {
    state
        .clips_by_track(track_id)
        .iter()
        .map(|c| c.end_time())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context_with_project;

    fn import(ctx: &Context, paths: &[&str], duration: TimeSec) -> Vec<String> {
        run(
            ctx,
            BatchCommand::Import {
                paths: paths.iter().map(|p| p.to_string()).collect(),
                media_type: None,
                duration: Some(duration),
            },
        )
        .unwrap();
        ctx.load().unwrap().sources().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_import_adds_sources_in_order() {
        let (_dir, ctx) = context_with_project("B");
        import(&ctx, &["/m/a.mp4", "/m/b.png", "/m/c.mp3"], 3.0);

        let state = ctx.load().unwrap();
        let types: Vec<MediaType> = state.sources().map(|s| s.media_type).collect();
        assert_eq!(
            types,
            vec![MediaType::Video, MediaType::Image, MediaType::Audio]
        );
    }

    #[test]
    fn test_concat_places_clips_back_to_back() {
        let (_dir, ctx) = context_with_project("B");
        let sources = import(&ctx, &["/m/a.mp4", "/m/b.mp4"], 4.0);

        run(
            &ctx,
            BatchCommand::Concat {
                source_ids: sources.clone(),
                track: None,
            },
        )
        .unwrap();
        run(
            &ctx,
            BatchCommand::Concat {
                source_ids: vec![sources[0].clone(), "ghost".to_string()],
                track: None,
            },
        )
        .unwrap();

        let state = ctx.load().unwrap();
        let track_id = state.clips().next().unwrap().track_id.clone();
        let starts: Vec<TimeSec> = state
            .clips_by_track(&track_id)
            .iter()
            .map(|c| c.start_time)
            .collect();
        assert_eq!(starts, vec![0.0, 4.0, 8.0]);
        assert_eq!(state.duration(), 12.0);
    }

    #[test]
    fn test_concat_with_no_valid_sources_fails() {
        let (_dir, ctx) = context_with_project("B");
        let track_id = ctx.load().unwrap().tracks().next().unwrap().id.clone();

        let result = run(
            &ctx,
            BatchCommand::Concat {
                source_ids: vec!["ghost".to_string()],
                track: Some(track_id),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_effect_and_remove_skip_unknown_clips() {
        let (_dir, ctx) = context_with_project("B");
        let sources = import(&ctx, &["/m/a.mp4", "/m/b.mp4"], 2.0);
        run(
            &ctx,
            BatchCommand::Concat {
                source_ids: sources,
                track: None,
            },
        )
        .unwrap();
        let clip_ids: Vec<String> = ctx.load().unwrap().clips().map(|c| c.id.clone()).collect();

        let mut targets = clip_ids.clone();
        targets.push("ghost".to_string());
        run(
            &ctx,
            BatchCommand::ApplyEffect {
                effect_type: "fadeIn".to_string(),
                clip_ids: targets.clone(),
                params: vec![],
            },
        )
        .unwrap();
        let state = ctx.load().unwrap();
        assert!(state.clips().all(|c| c.effects.len() == 1));

        run(&ctx, BatchCommand::RemoveClips { clip_ids: targets }).unwrap();
        assert_eq!(ctx.load().unwrap().clip_count(), 0);
    }

    #[test]
    fn test_apply_effect_rejects_bad_params() {
        let (_dir, ctx) = context_with_project("B");
        let result = run(
            &ctx,
            BatchCommand::ApplyEffect {
                effect_type: "volume".to_string(),
                clip_ids: vec!["c".to_string()],
                params: vec!["level=9".to_string()],
            },
        );
        assert!(result.is_err());
    }
}
