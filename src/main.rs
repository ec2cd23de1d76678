//! Module Configuration Kit - demo host
//!
//! Activates the plugin from its settings file, drives a few configuration
//! edits through UI bindings, and deactivates again.

use log::{error, info, warn};
use module_config_kit::error::{ErrorContext, Result};
use module_config_kit::logging::{init_logging, LoggingConfig};
use module_config_kit::modules::builtin::{select_language, CodeBlockConfig, EditorConfig, CODE_BLOCK, EDITOR};
use module_config_kit::modules::{ConfigBinding, ConfigPatch};
use module_config_kit::persistence::FileStorage;
use module_config_kit::settings::{LoadOutcome, SettingsManager};
use module_config_kit::ModuleHost;
use std::sync::Arc;

/// Languages the embedded code editor ships with
const BUNDLED_LANGUAGES: &[&str] = &["plaintext", "rust", "javascript", "python", "markdown"];

fn main() {
    if let Err(e) = run() {
        let ctx = ErrorContext::new(e, "module-config-kit");
        error!("{}", ctx);
        eprintln!("{}", ctx);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings_manager = SettingsManager::locate()?;
    let (settings, outcome) = settings_manager.load_with_outcome()?;

    // Loading ran before any logger existed, so report it again here
    init_logging(LoggingConfig::from_settings(&settings.logging, settings.log_dir()))?;
    match outcome {
        LoadOutcome::Defaults => info!(
            "No settings at {:?}, using defaults",
            settings_manager.settings_path()
        ),
        LoadOutcome::Loaded => info!("Settings: {:?}", settings_manager.settings_path()),
        LoadOutcome::Migrated { from } => info!(
            "Settings: {:?} (migrated from version {})",
            settings_manager.settings_path(),
            from
        ),
    }

    let storage = Arc::new(FileStorage::new(settings.modules_dir()));
    let mut host = ModuleHost::new(settings, storage);
    host.activate()?;

    if host.registry().contains(EDITOR.id()) {
        let mut editor: ConfigBinding<EditorConfig> = ConfigBinding::bind(&host, &EDITOR)?;
        info!("Editor before: {:?}", editor.current());
        let font_size = editor.current().font_size + 1;
        editor.update(ConfigPatch::new().set("fontSize", font_size))?;
        info!("Editor after: {:?}", editor.current());
    }

    if host.registry().contains(CODE_BLOCK.id()) {
        let mut code: ConfigBinding<CodeBlockConfig> = ConfigBinding::bind(&host, &CODE_BLOCK)?;
        let probe = |name: &str| BUNDLED_LANGUAGES.iter().any(|lang| *lang == name);
        select_language(&mut code, &probe, "rust")?;
        info!("Code blocks: {:?}", code.current());
    }

    host.flush_persistence();
    for event in host.persistence_events() {
        if let Some(e) = event.into_error() {
            warn!("{}", ErrorContext::new(e, "persisting module configuration"));
        }
    }

    host.deactivate();
    Ok(())
}
