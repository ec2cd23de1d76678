//! Plugin settings

pub mod config;

pub use config::{LoadOutcome, PluginSettings, SettingsManager};
