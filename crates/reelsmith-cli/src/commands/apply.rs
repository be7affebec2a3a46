//! `reelsmith apply <script.json>`
//!
//! Runs a command script (a JSON array of commands, or `{"commands": [...]}`)
//! through the translator, one command at a time.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use reelsmith_core::ai::{BatchOutcome, CommandSource, CommandTranslator, ScriptCommandSource};

use super::Context;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Command script to run
    pub script: PathBuf,

    /// Run against the project without saving it
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("cannot read {}", args.script.display()))?;
    let outcome = apply_script(ctx, &ScriptCommandSource::new(), &text, args.dry_run).await?;
    print_outcome(&outcome, args.dry_run);
    Ok(())
}

/// Executes the script's commands and saves the project when at least one
/// succeeded (never in dry-run mode)
pub async fn apply_script(
    ctx: &Context,
    source: &dyn CommandSource,
    input: &str,
    dry_run: bool,
) -> Result<BatchOutcome> {
    let commands = source
        .commands(input)
        .await
        .with_context(|| format!("invalid {} input", source.name()))?;

    let mut state = ctx.load()?;
    let mut executor = ctx.executor();
    let outcome = CommandTranslator::new().execute_batch(&commands, &mut state, &mut executor);

    if outcome.any_succeeded() && !dry_run {
        ctx.save(&mut state)?;
    }
    Ok(outcome)
}

fn print_outcome(outcome: &BatchOutcome, dry_run: bool) {
    println!("{}", outcome.summary());
    for command in &outcome.outcomes {
        match &command.error {
            None => println!("  [ok]     {}: {}", command.index, command.description),
            Some(error) => println!(
                "  [failed] {}: {} ({})",
                command.index, command.description, error
            ),
        }
    }
    if dry_run {
        println!("Dry run: project not saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context_with_project;
    use reelsmith_core::project::ProjectState;
    use reelsmith_core::timeline::{ClipSpec, SourceSpec};
    use reelsmith_core::MediaType;

    /// Saves a project with one 10s clip and returns its id
    fn seed(ctx: &Context) -> String {
        let mut state = ProjectState::new("Script");
        let source = state.add_source(
            SourceSpec::new("a", MediaType::Video, "/m/a.mp4").with_duration(10.0),
        );
        let track_id = state.tracks().next().unwrap().id.clone();
        let clip = state
            .add_clip(ClipSpec::new(&source.id, &track_id, 0.0))
            .unwrap();
        ctx.save(&mut state).unwrap();
        clip.id
    }

    #[tokio::test]
    async fn test_apply_counts_and_saves() {
        let (_dir, ctx) = context_with_project("Script");
        let clip_id = seed(&ctx);
        let script = format!(
            r#"{{"commands": [
                {{"action": "split", "clipIds": ["{id}"], "params": {{"at": 4}}}},
                {{"action": "teleport", "clipIds": ["{id}"]}}
            ]}}"#,
            id = clip_id
        );

        let outcome = apply_script(&ctx, &ScriptCommandSource::new(), &script, false)
            .await
            .unwrap();

        assert_eq!(outcome.executed, 1);
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.summary(), "Executed 1/2 commands");
        assert_eq!(ctx.load().unwrap().clip_count(), 2);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_save() {
        let (_dir, ctx) = context_with_project("Script");
        let clip_id = seed(&ctx);
        let script = format!(r#"[{{"action": "remove-clip", "clipIds": ["{}"]}}]"#, clip_id);

        let outcome = apply_script(&ctx, &ScriptCommandSource::new(), &script, true)
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(ctx.load().unwrap().clip_count(), 1);
    }

    #[tokio::test]
    async fn test_all_failed_leaves_file_untouched() {
        let (_dir, ctx) = context_with_project("Script");
        seed(&ctx);
        let before = std::fs::read_to_string(&ctx.project_path).unwrap();

        let outcome = apply_script(
            &ctx,
            &ScriptCommandSource::new(),
            r#"[{"action": "split", "clipIds": ["ghost"], "params": {"at": 1}}]"#,
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome.executed, 0);
        assert_eq!(std::fs::read_to_string(&ctx.project_path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_malformed_script_is_an_error() {
        let (_dir, ctx) = context_with_project("Script");
        let result = apply_script(&ctx, &ScriptCommandSource::new(), "{\"oops\": 1}", false).await;
        assert!(result.is_err());
    }
}
