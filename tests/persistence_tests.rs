//! Tests for configuration persistence through the host plugin

use module_config_kit::modules::builtin::{EditorConfig, CODE_BLOCK, EDITOR};
use module_config_kit::modules::{ConfigBinding, ConfigPatch, ManagerHost, ModuleConfig, ModuleKey, ModuleKind};
use module_config_kit::persistence::mocks::{FailingStorage, UnreadableStorage};
use module_config_kit::persistence::{ConfigStorage, FileStorage, MemoryStorage, PersistenceEvent};
use module_config_kit::settings::PluginSettings;
use module_config_kit::{AppError, ModuleHost};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

fn editor_only() -> PluginSettings {
    let mut settings = PluginSettings::default();
    settings.general.enabled_modules = vec![ModuleKind::Editor.id()];
    settings
}

#[test]
fn test_update_is_written_to_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let mut host = ModuleHost::new(editor_only(), storage.clone());
    host.activate().unwrap();

    let mut binding = ConfigBinding::bind(&host, &EDITOR).unwrap();
    binding.update(ConfigPatch::new().set("fontSize", 16)).unwrap();
    host.flush_persistence();

    let stored = storage.get(EDITOR.id()).unwrap();
    assert_eq!(stored["fontSize"], 16);
    assert_eq!(stored["theme"], "dark");
}

#[test]
fn test_failed_write_keeps_in_memory_value() {
    let storage = Arc::new(FailingStorage::default());
    let mut host = ModuleHost::new(editor_only(), storage.clone());
    host.activate().unwrap();

    let mut binding = ConfigBinding::bind(&host, &EDITOR).unwrap();
    binding.update(ConfigPatch::new().set("theme", "light")).unwrap();
    host.flush_persistence();

    assert_eq!(binding.current().theme, "light");
    assert_eq!(host.get_manager(&EDITOR).unwrap().get_config().theme, "light");
    assert_eq!(storage.attempts(), 1);

    let events = host.persistence_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].clone().into_error(),
        Some(AppError::PersistenceWrite { .. })
    ));
}

#[test]
fn test_unreadable_store_starts_from_defaults() {
    let mut host = ModuleHost::new(editor_only(), Arc::new(UnreadableStorage));
    host.activate().unwrap();

    assert_eq!(host.get_manager(&EDITOR).unwrap().get_config(), EditorConfig::default());
}

#[test]
fn test_values_survive_reactivation_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path().join("modules")));

    {
        let mut host = ModuleHost::new(editor_only(), storage.clone());
        host.activate().unwrap();
        let mut binding = ConfigBinding::bind(&host, &EDITOR).unwrap();
        binding
            .update(ConfigPatch::new().set("theme", "solarized").set("lineWrap", true))
            .unwrap();
        host.deactivate();
    }

    assert!(dir.path().join("modules").join("editor.toml").exists());

    let mut host = ModuleHost::new(editor_only(), storage);
    host.activate().unwrap();
    let config = host.get_manager(&EDITOR).unwrap().get_config();
    assert_eq!(config.theme, "solarized");
    assert!(config.line_wrap);
    assert_eq!(config.font_size, 14);
}

#[test]
fn test_file_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let value = serde_json::json!({"language": "rust", "lineNumbers": false});

    storage.save(CODE_BLOCK.id(), &value).unwrap();
    assert_eq!(storage.load(CODE_BLOCK.id()).unwrap(), Some(value));
}

#[test]
fn test_disabled_persistence_skips_writes() {
    let mut settings = editor_only();
    settings.persistence.enabled = false;
    let storage = Arc::new(MemoryStorage::new());
    let mut host = ModuleHost::new(settings, storage.clone());
    host.activate().unwrap();

    let mut binding = ConfigBinding::bind(&host, &EDITOR).unwrap();
    binding.update(ConfigPatch::new().set("fontSize", 20)).unwrap();
    host.flush_persistence();

    assert!(storage.get(EDITOR.id()).is_none());
    assert!(!binding.manager().is_persistent());
    assert!(host.persistence_events().is_empty());
}

#[test]
fn test_written_events_are_reported() {
    let mut host = ModuleHost::new(editor_only(), Arc::new(MemoryStorage::new()));
    host.activate().unwrap();

    let mut binding = ConfigBinding::bind(&host, &EDITOR).unwrap();
    binding.update(ConfigPatch::new().set("fontSize", 12)).unwrap();
    host.flush_persistence();

    assert_eq!(
        host.persistence_events(),
        vec![PersistenceEvent::Written {
            module: EDITOR.id().clone()
        }]
    );
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct Highlight {
    color: String,
    accent: Option<String>,
}

impl ModuleConfig for Highlight {}

const HIGHLIGHT: ModuleKey<Highlight> = ModuleKey::from_static("highlight");

#[test]
fn test_unset_option_is_written_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));

    {
        let mut host = ModuleHost::new(editor_only(), storage.clone());
        host.activate().unwrap();
        host.enable(&HIGHLIGHT).unwrap();

        let mut binding = ConfigBinding::bind(&host, &HIGHLIGHT).unwrap();
        binding.update(ConfigPatch::new().set("color", "yellow")).unwrap();
        host.flush_persistence();
        assert!(host.persistence_events().iter().all(|e| e.clone().into_error().is_none()));
    }

    let mut host = ModuleHost::new(editor_only(), storage);
    host.activate().unwrap();
    let config = host.enable(&HIGHLIGHT).unwrap().get_config();
    assert_eq!(config.color, "yellow");
    assert_eq!(config.accent, None);
}

#[test]
fn test_file_storage_drops_null_fields() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let value = serde_json::json!({"color": "blue", "accent": null, "nested": {"hint": null, "size": 2}});

    storage.save(HIGHLIGHT.id(), &value).unwrap();
    let stored = storage.load(HIGHLIGHT.id()).unwrap().unwrap();
    assert_eq!(stored, serde_json::json!({"color": "blue", "nested": {"size": 2}}));
    assert_eq!(stored.get("accent"), None::<&Value>);
}
