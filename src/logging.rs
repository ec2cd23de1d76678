//! Logging setup with size-based rotation

use crate::error::{AppError, Result};
use crate::settings::config::LoggingSettings;
use log::LevelFilter;
use simplelog::{CombinedLogger, ConfigBuilder, SharedLogger, WriteLogger};
#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Default log filename
const LOG_FILENAME: &str = "module_config_kit.log";

/// Logger options resolved from the plugin settings
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub log_dir: PathBuf,
    pub max_file_size: u64,
    pub max_files: u32,
}

impl LoggingConfig {
    pub fn from_settings(settings: &LoggingSettings, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: parse_log_level(&settings.level),
            log_dir: log_dir.into(),
            max_file_size: settings.max_file_size,
            max_files: settings.max_files,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingSettings::default(), ".")
    }
}

/// Install the global logger. Can only succeed once per process.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    fs::create_dir_all(&config.log_dir)?;
    let log_path = config.log_dir.join(LOG_FILENAME);

    rotate_logs(&log_path, config.max_file_size, config.max_files)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Debug)
        .set_thread_level(LevelFilter::Debug)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    // Terminal logger (for debug builds)
    #[cfg(debug_assertions)]
    {
        loggers.push(TermLogger::new(
            config.level,
            log_config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }

    loggers.push(WriteLogger::new(config.level, log_config, log_file));

    CombinedLogger::init(loggers)
        .map_err(|e| AppError::ConfigError(format!("Logger init failed: {}", e)))?;

    log::info!("Logging to {:?} at level {:?}", log_path, config.level);
    Ok(())
}

/// Shift `name.log` to `name.log.1`, `.1` to `.2` and so on, dropping the
/// oldest, once the current file reaches `max_size`.
fn rotate_logs(log_path: &Path, max_size: u64, max_files: u32) -> Result<()> {
    let size = match fs::metadata(log_path) {
        Ok(metadata) => metadata.len(),
        Err(_) => return Ok(()),
    };
    if size < max_size || max_files == 0 {
        return Ok(());
    }

    let numbered = |i: u32| log_path.with_extension(format!("log.{}", i));

    let oldest = numbered(max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }

    for i in (1..max_files).rev() {
        let from = numbered(i);
        if from.exists() {
            fs::rename(&from, numbered(i + 1))?;
        }
    }

    fs::rename(log_path, numbered(1))?;
    Ok(())
}

/// Parse log level from string, defaulting to info
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}
