//! Settings Persistence
//!
//! Application settings with:
//! - Atomic file writes (temp file + rename)
//! - Advisory locking so concurrent processes don't interleave writes
//! - Defaults for missing sections and normalization of bad values
//!
//! Storage location: {config_dir}/reelsmith/settings.json, or
//! `$REELSMITH_CONFIG_DIR/settings.json` when the variable is set.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::commands::DEFAULT_MAX_HISTORY;
use crate::generative::{
    GenerativeProviderConfig, ProviderCapability, DEFAULT_GENERATION_TIMEOUT,
};
use crate::project::DEFAULT_FRAME_RATE;
use crate::{AspectRatio, CoreError, CoreResult};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Lock file name (advisory lock to prevent concurrent writers)
pub const SETTINGS_LOCK_FILE: &str = "settings.json.lock";

/// Environment variable overriding the settings directory
pub const CONFIG_DIR_ENV: &str = "REELSMITH_CONFIG_DIR";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Defaults for newly created projects
    #[serde(default)]
    pub project: ProjectDefaults,

    /// Undo/redo history
    #[serde(default)]
    pub history: HistorySettings,

    /// Generation requests
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Per-provider configuration, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, GenerativeProviderConfig>,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            project: ProjectDefaults::default(),
            history: HistorySettings::default(),
            generation: GenerationSettings::default(),
            providers: HashMap::new(),
        }
    }
}

impl AppSettings {
    /// Normalizes and clamps settings so persisted state is always valid.
    ///
    /// Bad values are corrected rather than rejected.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;

        self.project.frame_rate = self.project.frame_rate.clamp(1, 240);
        if self.project.file_name.trim().is_empty() {
            self.project.file_name = default_file_name();
        }

        self.history.max_undo = self.history.max_undo.clamp(1, 1000);

        self.generation.timeout_sec = self.generation.timeout_sec.clamp(5, 3600);
        self.generation
            .default_providers
            .retain(|_, name| !name.trim().is_empty());

        for config in self.providers.values_mut() {
            config.timeout_sec = config.timeout_sec.clamp(1, 600);
            config.max_retries = config.max_retries.min(10);
            if config.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                config.api_key = None;
            }
        }
    }
}

/// Defaults applied by `project create`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDefaults {
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,

    /// Project file used when no path is given
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            frame_rate: default_frame_rate(),
            file_name: default_file_name(),
        }
    }
}

fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

fn default_file_name() -> String {
    format!("project.{}", crate::project::PROJECT_FILE_EXTENSION)
}

/// Undo/redo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistorySettings {
    #[serde(default = "default_max_undo")]
    pub max_undo: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_undo: default_max_undo(),
        }
    }
}

fn default_max_undo() -> usize {
    DEFAULT_MAX_HISTORY
}

/// Generation request settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    /// How long to wait for a long-running job
    #[serde(default = "default_generation_timeout")]
    pub timeout_sec: u64,

    /// Preferred provider per capability
    #[serde(default)]
    pub default_providers: HashMap<ProviderCapability, String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            timeout_sec: default_generation_timeout(),
            default_providers: HashMap::new(),
        }
    }
}

impl GenerationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}

fn default_generation_timeout() -> u64 {
    DEFAULT_GENERATION_TIMEOUT.as_secs()
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Resolves the settings directory from an explicit override, falling back
/// to the platform config directory
fn resolve_config_dir(override_dir: Option<OsString>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reelsmith"),
    }
}

/// Settings manager for loading, saving, and resetting settings
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a new settings manager rooted at the given directory
    pub fn new(config_dir: PathBuf) -> Self {
        Self {
            settings_path: config_dir.join(SETTINGS_FILE),
        }
    }

    /// Settings manager for the default location
    pub fn from_env() -> Self {
        Self::new(Self::default_dir())
    }

    /// `$REELSMITH_CONFIG_DIR`, else `{config_dir}/reelsmith`
    pub fn default_dir() -> PathBuf {
        resolve_config_dir(std::env::var_os(CONFIG_DIR_ENV))
    }

    fn lock_path(&self) -> PathBuf {
        self.settings_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_LOCK_FILE)
    }

    fn with_lock<T>(&self, exclusive: bool, op: impl FnOnce() -> CoreResult<T>) -> CoreResult<T> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;

        if exclusive {
            fs2::FileExt::lock_exclusive(&lock_file)?;
        } else {
            fs2::FileExt::lock_shared(&lock_file)?;
        }

        let result = op();

        if let Err(e) = fs2::FileExt::unlock(&lock_file) {
            warn!("Failed to unlock settings lock file: {}", e);
        }

        result
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &PathBuf {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or
    /// unreadable
    pub fn load(&self) -> AppSettings {
        // Reads never create the config directory or lock file
        if !self.settings_path.exists() {
            info!("Settings file not found, using defaults");
            return AppSettings::default();
        }

        let result = self.with_lock(false, || {
            if !self.settings_path.exists() {
                info!("Settings file not found, using defaults");
                return Ok(AppSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings = serde_json::from_str::<AppSettings>(&content)?;

            if settings.version < SETTINGS_VERSION {
                info!(
                    "Migrating settings from version {} to {}",
                    settings.version, SETTINGS_VERSION
                );
                settings = migrate(settings);
            }

            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Save settings to disk using atomic write (temp file + rename).
    /// Returns the normalized settings that were written.
    pub fn save(&self, settings: &AppSettings) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            let content = serde_json::to_string_pretty(&normalized)?;

            let temp_path = self.settings_path.with_extension("json.tmp");
            if temp_path.exists() {
                let _ = fs::remove_file(&temp_path);
            }

            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            drop(file);

            if let Err(e) = fs::rename(&temp_path, &self.settings_path) {
                let _ = fs::remove_file(&temp_path);
                return Err(CoreError::IoError(e));
            }

            info!("Settings saved to {:?}", self.settings_path);
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CoreResult<AppSettings> {
        self.with_lock(true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
                info!("Settings file deleted");
            }
            Ok(AppSettings::default())
        })
    }
}

/// Migrate settings from an older version
fn migrate(mut settings: AppSettings) -> AppSettings {
    // v0 files predate the history section; an explicit 0 there was never
    // a meaningful value
    if settings.version < 1 && settings.history.max_undo == 0 {
        settings.history.max_undo = default_max_undo();
    }

    settings.version = SETTINGS_VERSION;
    settings
}
