//! Plugin settings with versioning and migration

use crate::error::{AppError, Result};
use crate::modules::{ModuleId, ModuleKind};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Current settings version
pub const SETTINGS_VERSION: u32 = 2;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.toml";

/// Environment variable overriding the plugin home directory
pub const HOME_ENV: &str = "MODULE_CONFIG_KIT_HOME";

/// Plugin-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Settings version for migration
    #[serde(default = "default_version")]
    pub config_version: u32,

    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Directory holding module configurations and logs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Modules enabled when the plugin activates
    #[serde(default = "default_enabled_modules")]
    pub enabled_modules: Vec<ModuleId>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_enabled_modules() -> Vec<ModuleId> {
    ModuleKind::ALL.iter().map(|kind| kind.id()).collect()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            enabled_modules: default_enabled_modules(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum log file size in bytes
    #[serde(default = "default_max_log_size")]
    pub max_file_size: u64,

    /// Number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_log_files() -> u32 {
    3
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_file_size: default_max_log_size(),
            max_files: default_max_log_files(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Write module configurations to disk
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            config_version: SETTINGS_VERSION,
            general: GeneralSettings::default(),
            logging: LoggingSettings::default(),
            persistence: PersistenceSettings::default(),
        }
    }
}

impl PluginSettings {
    /// Directory with one file per module configuration
    pub fn modules_dir(&self) -> PathBuf {
        self.general.data_dir.join("modules")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.general.data_dir.join("logs")
    }

    /// Migrate settings from an older version
    fn migrate(&mut self) {
        if self.config_version >= SETTINGS_VERSION {
            return;
        }

        info!(
            "Migrating settings from version {} to {}",
            self.config_version, SETTINGS_VERSION
        );

        // v1 to v2: the code editor module was renamed from "codemirror"
        if self.config_version < 2 {
            for id in &mut self.general.enabled_modules {
                if id.as_str() == "codemirror" {
                    *id = ModuleKind::CodeBlock.id();
                }
            }
            self.dedup_enabled_modules();
            info!("Migrated settings from v1 to v2: renamed codemirror module");
        }

        self.config_version = SETTINGS_VERSION;
    }

    /// Drop repeated module ids, keeping the first occurrence.
    /// Returns how many entries were removed.
    pub fn dedup_enabled_modules(&mut self) -> usize {
        let before = self.general.enabled_modules.len();
        let mut seen = HashSet::new();
        self.general
            .enabled_modules
            .retain(|id| seen.insert(id.clone()));
        before - self.general.enabled_modules.len()
    }
}

/// What [`SettingsManager::load_with_outcome`] found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No settings file; defaults in use
    Defaults,
    Loaded,
    /// File was older and has been migrated and saved
    Migrated { from: u32 },
}

/// Loads and saves [`PluginSettings`]
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    /// Settings file in `$MODULE_CONFIG_KIT_HOME`, or the working directory
    pub fn locate() -> Result<Self> {
        let home = match std::env::var_os(HOME_ENV) {
            Some(home) => PathBuf::from(home),
            None => std::env::current_dir()
                .map_err(|e| AppError::ConfigError(format!("Could not get working directory: {}", e)))?,
        };
        debug!("Using plugin home {:?}", home);
        Ok(Self::new(home.join(SETTINGS_FILENAME)))
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from file
    pub fn load(&self) -> Result<PluginSettings> {
        self.load_with_outcome().map(|(settings, _)| settings)
    }

    /// Load settings and report whether defaults were used or a migration ran,
    /// so callers that set up logging afterwards can still record it.
    pub fn load_with_outcome(&self) -> Result<(PluginSettings, LoadOutcome)> {
        if !self.settings_path.exists() {
            info!("Settings file not found, using defaults");
            return Ok((PluginSettings::default(), LoadOutcome::Defaults));
        }

        let content = fs::read_to_string(&self.settings_path)
            .map_err(|e| AppError::ConfigError(format!("Could not read settings: {}", e)))?;

        let mut settings: PluginSettings = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Could not parse settings: {}", e)))?;

        let outcome = if settings.config_version < SETTINGS_VERSION {
            let from = settings.config_version;
            settings.migrate();
            self.save(&settings)?;
            LoadOutcome::Migrated { from }
        } else {
            LoadOutcome::Loaded
        };

        let removed = settings.dedup_enabled_modules();
        if removed > 0 {
            warn!("Ignoring {} repeated module id(s) in settings", removed);
        }

        info!("Loaded settings from {:?}", self.settings_path);
        Ok((settings, outcome))
    }

    /// Save settings to file
    pub fn save(&self, settings: &PluginSettings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(settings)
            .map_err(|e| AppError::ConfigError(format!("Could not serialize settings: {}", e)))?;

        fs::write(&self.settings_path, content)
            .map_err(|e| AppError::ConfigError(format!("Could not write settings: {}", e)))?;

        info!("Saved settings to {:?}", self.settings_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PluginSettings::default();
        assert_eq!(settings.config_version, SETTINGS_VERSION);
        assert!(settings.persistence.enabled);
        assert_eq!(settings.general.enabled_modules.len(), ModuleKind::ALL.len());
    }

    #[test]
    fn test_v1_migration_renames_codemirror() {
        let mut settings: PluginSettings = toml::from_str(
            r#"
            config_version = 1

            [general]
            enabled_modules = ["editor", "codemirror"]
            "#,
        )
        .unwrap();
        settings.migrate();

        assert_eq!(settings.config_version, SETTINGS_VERSION);
        assert_eq!(
            settings.general.enabled_modules,
            vec![ModuleId::new("editor"), ModuleId::new("code_block")]
        );
    }

    #[test]
    fn test_v1_migration_collapses_renamed_duplicates() {
        let mut settings: PluginSettings = toml::from_str(
            r#"
            config_version = 1

            [general]
            enabled_modules = ["codemirror", "editor", "code_block"]
            "#,
        )
        .unwrap();
        settings.migrate();

        assert_eq!(
            settings.general.enabled_modules,
            vec![ModuleId::new("code_block"), ModuleId::new("editor")]
        );
    }

    #[test]
    fn test_derived_directories() {
        let settings = PluginSettings::default();
        assert_eq!(settings.modules_dir(), PathBuf::from("data/modules"));
        assert_eq!(settings.log_dir(), PathBuf::from("data/logs"));
    }
}
