//! Reelsmith CLI
//!
//! Headless front end for the timeline engine. Every invocation loads the
//! project file, applies one operation and writes it back.

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use reelsmith_core::settings::SettingsManager;

use commands::{
    apply::ApplyArgs, batch::BatchCommand, project::ProjectCommand, settings::SettingsCommand,
    timeline::TimelineCommand, Context,
};

/// AI-assisted timeline editor
#[derive(Parser, Debug)]
#[command(name = "reelsmith", author, version, about, long_about = None)]
struct Cli {
    /// Project file (default: project.reelsmith.json, or the configured name)
    #[arg(short, long, global = true, value_name = "PATH")]
    project: Option<PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create and inspect projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    /// Edit sources, tracks, clips and effects
    Timeline {
        #[command(subcommand)]
        command: TimelineCommand,
    },

    /// Operations over many sources or clips at once
    Batch {
        #[command(subcommand)]
        command: BatchCommand,
    },

    /// Run a JSON command script through the translator
    Apply(ApplyArgs),

    /// Inspect or change user settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Avoid panics if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = SettingsManager::from_env();
    let settings = manager.load();
    let project_path = cli
        .project
        .unwrap_or_else(|| PathBuf::from(&settings.project.file_name));
    let ctx = Context::new(project_path, settings);

    match cli.command {
        Commands::Project { command } => commands::project::run(&ctx, command),
        Commands::Timeline { command } => commands::timeline::run(&ctx, command),
        Commands::Batch { command } => commands::batch::run(&ctx, command),
        Commands::Apply(args) => commands::apply::run(&ctx, args).await,
        Commands::Settings { command } => commands::settings::run(&manager, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reelsmith",
            "timeline",
            "split",
            "c1",
            "2.5",
            "--project",
            "cut.reelsmith.json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.project, Some(PathBuf::from("cut.reelsmith.json")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Timeline {
                command: TimelineCommand::Split { .. }
            }
        ));
    }

    #[test]
    fn test_settings_default_provider_flag() {
        let cli = Cli::try_parse_from([
            "reelsmith",
            "settings",
            "set",
            "--default-provider",
            "tts=voicebox",
            "--default-provider",
            "image=painter",
        ])
        .unwrap();
        match cli.command {
            Commands::Settings {
                command: SettingsCommand::Set {
                    default_providers, ..
                },
            } => assert_eq!(default_providers, vec!["tts=voicebox", "image=painter"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_apply_dry_run_flag() {
        let cli = Cli::try_parse_from(["reelsmith", "apply", "script.json", "--dry-run"]).unwrap();
        match cli.command {
            Commands::Apply(args) => {
                assert!(args.dry_run);
                assert_eq!(args.script, PathBuf::from("script.json"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
