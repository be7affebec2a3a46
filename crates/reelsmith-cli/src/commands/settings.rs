//! `reelsmith settings ...`
//!
//! Reads and writes the per-user settings file rather than the project.

use anyhow::{anyhow, bail, Context as _, Result};
use clap::Subcommand;
use reelsmith_core::generative::ProviderCapability;
use reelsmith_core::settings::{AppSettings, SettingsManager};
use reelsmith_core::AspectRatio;

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the effective settings
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Print the settings file location
    Path,

    /// Change persisted settings (out-of-range values are clamped)
    Set {
        /// Aspect ratio for new projects
        #[arg(long)]
        aspect_ratio: Option<AspectRatio>,

        /// Frame rate for new projects
        #[arg(long)]
        frame_rate: Option<u32>,

        /// Project file used when --project is not given
        #[arg(long)]
        file_name: Option<String>,

        /// Undo history depth
        #[arg(long)]
        max_undo: Option<usize>,

        /// Seconds to wait for long-running generation jobs
        #[arg(long, value_name = "SECS")]
        generation_timeout: Option<u64>,

        /// Preferred provider for a capability (repeatable)
        #[arg(long = "default-provider", value_name = "CAPABILITY=NAME")]
        default_providers: Vec<String>,
    },

    /// Delete the settings file
    Reset,
}

pub fn run(manager: &SettingsManager, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show { json } => {
            let settings = manager.load();
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings);
            }
            Ok(())
        }

        SettingsCommand::Path => {
            println!("{}", manager.settings_path().display());
            Ok(())
        }

        SettingsCommand::Set {
            aspect_ratio,
            frame_rate,
            file_name,
            max_undo,
            generation_timeout,
            default_providers,
        } => {
            let mut settings = manager.load();
            let mut changed = false;

            if let Some(aspect_ratio) = aspect_ratio {
                settings.project.aspect_ratio = aspect_ratio;
                changed = true;
            }
            if let Some(frame_rate) = frame_rate {
                settings.project.frame_rate = frame_rate;
                changed = true;
            }
            if let Some(file_name) = file_name {
                settings.project.file_name = file_name;
                changed = true;
            }
            if let Some(max_undo) = max_undo {
                settings.history.max_undo = max_undo;
                changed = true;
            }
            if let Some(timeout) = generation_timeout {
                settings.generation.timeout_sec = timeout;
                changed = true;
            }
            for entry in &default_providers {
                let (capability, name) = parse_default_provider(entry)?;
                settings.generation.default_providers.insert(capability, name);
                changed = true;
            }

            if !changed {
                bail!("nothing to change; see `reelsmith settings set --help`");
            }

            let saved = manager.save(&settings).with_context(|| {
                format!("cannot write {}", manager.settings_path().display())
            })?;
            print_settings(&saved);
            Ok(())
        }

        SettingsCommand::Reset => {
            manager.reset().with_context(|| {
                format!("cannot reset {}", manager.settings_path().display())
            })?;
            println!("Settings reset to defaults");
            Ok(())
        }
    }
}

fn parse_default_provider(entry: &str) -> Result<(ProviderCapability, String)> {
    let (capability, name) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid default provider '{}', expected CAPABILITY=NAME", entry))?;
    let capability = capability.parse::<ProviderCapability>().map_err(|e| anyhow!(e))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("invalid default provider '{}', empty name", entry);
    }
    Ok((capability, name.to_string()))
}

fn print_settings(settings: &AppSettings) {
    println!("Aspect ratio:       {}", settings.project.aspect_ratio);
    println!("Frame rate:         {} fps", settings.project.frame_rate);
    println!("Project file:       {}", settings.project.file_name);
    println!("Undo history:       {}", settings.history.max_undo);
    println!("Generation timeout: {}s", settings.generation.timeout_sec);

    let mut defaults: Vec<_> = settings.generation.default_providers.iter().collect();
    defaults.sort_by_key(|(capability, _)| capability.to_string());
    for (capability, name) in defaults {
        println!("Default {:<11} {}", format!("{}:", capability), name);
    }

    let mut providers: Vec<_> = settings.providers.iter().collect();
    providers.sort_by(|a, b| a.0.cmp(b.0));
    for (name, config) in providers {
        println!(
            "Provider {}: model {}, key {}",
            name,
            config.model_id.as_deref().unwrap_or("default"),
            if config.api_key.is_some() { "set" } else { "missing" }
        );
    }
}
