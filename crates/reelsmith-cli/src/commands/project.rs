//! `reelsmith project ...`

use anyhow::{bail, Result};
use clap::Subcommand;
use reelsmith_core::commands::UpdateProjectSettingsCommand;
use reelsmith_core::project::{document, ProjectState};
use reelsmith_core::AspectRatio;

use super::{format_time, Context};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a new project file
    Create {
        name: String,

        /// 16:9, 9:16, 1:1 or 4:5
        #[arg(long)]
        aspect_ratio: Option<AspectRatio>,

        #[arg(long)]
        frame_rate: Option<u32>,

        /// Overwrite an existing project file
        #[arg(long)]
        force: bool,
    },

    /// Show project metadata and entity counts
    Info {
        /// Print the full project document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the project name or output format
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        aspect_ratio: Option<AspectRatio>,

        #[arg(long)]
        frame_rate: Option<u32>,
    },
}

pub fn run(ctx: &Context, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Create {
            name,
            aspect_ratio,
            frame_rate,
            force,
        } => create(ctx, &name, aspect_ratio, frame_rate, force),
        ProjectCommand::Info { json } => info(ctx, json),
        ProjectCommand::Set {
            name,
            aspect_ratio,
            frame_rate,
        } => set(ctx, name, aspect_ratio, frame_rate),
    }
}

fn create(
    ctx: &Context,
    name: &str,
    aspect_ratio: Option<AspectRatio>,
    frame_rate: Option<u32>,
    force: bool,
) -> Result<()> {
    if ctx.project_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            ctx.project_path.display()
        );
    }
    if frame_rate == Some(0) {
        bail!("frame rate must be a positive integer");
    }

    let defaults = &ctx.settings.project;
    let mut state = ProjectState::with_format(
        name,
        aspect_ratio.unwrap_or(defaults.aspect_ratio),
        frame_rate.unwrap_or(defaults.frame_rate),
    );
    ctx.save(&mut state)?;

    println!(
        "Created project '{}' ({}, {} fps) at {}",
        state.meta().name,
        state.meta().aspect_ratio,
        state.meta().frame_rate,
        ctx.project_path.display()
    );
    Ok(())
}

fn info(ctx: &Context, json: bool) -> Result<()> {
    let state = ctx.load()?;
    if json {
        println!("{}", document::serialize(&state)?);
        return Ok(());
    }

    let meta = state.meta();
    println!("Name:         {}", meta.name);
    println!("Aspect ratio: {}", meta.aspect_ratio);
    println!("Frame rate:   {} fps", meta.frame_rate);
    println!("Duration:     {}", format_time(meta.duration));
    println!("Sources:      {}", state.source_count());
    println!("Tracks:       {}", state.track_count());
    println!("Clips:        {}", state.clip_count());
    println!("Modified:     {}", meta.modified_at);

    let problems = state.check_invariants();
    if !problems.is_empty() {
        println!("Problems:");
        for problem in problems {
            println!("  - {}", problem);
        }
    }
    Ok(())
}

fn set(
    ctx: &Context,
    name: Option<String>,
    aspect_ratio: Option<AspectRatio>,
    frame_rate: Option<u32>,
) -> Result<()> {
    if name.is_none() && aspect_ratio.is_none() && frame_rate.is_none() {
        bail!("nothing to change; pass --name, --aspect-ratio or --frame-rate");
    }

    let mut command = UpdateProjectSettingsCommand::new();
    if let Some(name) = &name {
        command = command.with_name(name);
    }
    if let Some(aspect_ratio) = aspect_ratio {
        command = command.with_aspect_ratio(aspect_ratio);
    }
    if let Some(frame_rate) = frame_rate {
        command = command.with_frame_rate(frame_rate);
    }

    ctx.edit(|state, executor| {
        executor.execute(Box::new(command), state)?;
        let meta = state.meta();
        println!(
            "Updated project '{}' ({}, {} fps)",
            meta.name, meta.aspect_ratio, meta.frame_rate
        );
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context_with_project;
    use reelsmith_core::settings::AppSettings;

    #[test]
    fn test_create_uses_settings_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut settings = AppSettings::default();
        settings.project.aspect_ratio = AspectRatio::Portrait;
        settings.project.frame_rate = 24;
        let ctx = Context::new(document::default_path(dir.path()), settings);

        create(&ctx, "Reel", None, None, false).unwrap();

        let state = ctx.load().unwrap();
        assert_eq!(state.meta().name, "Reel");
        assert_eq!(state.meta().aspect_ratio, AspectRatio::Portrait);
        assert_eq!(state.meta().frame_rate, 24);
        assert_eq!(state.track_count(), 2);
    }

    #[test]
    fn test_create_refuses_to_overwrite() {
        let (_dir, ctx) = context_with_project("Existing");

        assert!(create(&ctx, "Other", None, None, false).is_err());
        create(&ctx, "Other", Some(AspectRatio::Square), Some(60), true).unwrap();

        let state = ctx.load().unwrap();
        assert_eq!(state.meta().name, "Other");
        assert_eq!(state.meta().frame_rate, 60);
    }

    #[test]
    fn test_set_updates_and_validates() {
        let (_dir, ctx) = context_with_project("Before");

        set(&ctx, Some("After".to_string()), None, Some(25)).unwrap();
        let state = ctx.load().unwrap();
        assert_eq!(state.meta().name, "After");
        assert_eq!(state.meta().frame_rate, 25);

        assert!(set(&ctx, None, None, None).is_err());
        assert!(set(&ctx, None, None, Some(0)).is_err());
        assert_eq!(ctx.load().unwrap().meta().frame_rate, 25);
    }

    #[test]
    fn test_info_on_missing_project_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let ctx = Context::new(dir.path().join("missing.reelsmith.json"), AppSettings::default());
        assert!(info(&ctx, false).is_err());
    }
}
