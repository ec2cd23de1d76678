//! Tests for the module manager registry

use module_config_kit::modules::{ConfigManager, ManagerHost, ManagerRegistry, ModuleConfig, ModuleId, ModuleKey};
use module_config_kit::AppError;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditorSettings {
    theme: String,
    font_size: u32,
}

impl ModuleConfig for EditorSettings {}

fn editor_key() -> ModuleKey<EditorSettings> {
    ModuleKey::new("editor")
}

fn editor_manager(theme: &str) -> Rc<ConfigManager<EditorSettings>> {
    Rc::new(ConfigManager::new(
        "editor",
        EditorSettings {
            theme: theme.to_string(),
            font_size: 14,
        },
    ))
}

#[test]
fn test_repeated_lookups_return_same_manager() {
    let mut registry = ManagerRegistry::new();
    let manager = editor_manager("dark");
    registry.register(Rc::clone(&manager)).unwrap();

    for _ in 0..3 {
        let found = registry.get_manager(&editor_key()).unwrap();
        assert!(Rc::ptr_eq(&found, &manager));
    }
}

#[test]
fn test_missing_module_on_empty_registry() {
    let registry = ManagerRegistry::new();
    let result = registry.get_manager(&ModuleKey::<EditorSettings>::new("missing"));

    match result {
        Err(AppError::UnknownModule(id)) => assert_eq!(id, ModuleId::new("missing")),
        _ => panic!("expected UnknownModule"),
    }
}

#[test]
fn test_duplicate_registration_keeps_original() {
    let mut registry = ManagerRegistry::new();
    let original = editor_manager("dark");
    registry.register(Rc::clone(&original)).unwrap();

    let result = registry.register(editor_manager("light"));
    assert!(matches!(result, Err(AppError::DuplicateModule(_))));

    let found = registry.get_manager(&editor_key()).unwrap();
    assert!(Rc::ptr_eq(&found, &original));
    assert_eq!(found.get_config().theme, "dark");
}

#[test]
fn test_unregister_then_lookup_fails() {
    let mut registry = ManagerRegistry::new();
    registry.register(editor_manager("dark")).unwrap();

    registry.unregister(&ModuleId::new("editor"));
    assert!(matches!(
        registry.get_manager(&editor_key()),
        Err(AppError::UnknownModule(_))
    ));

    // Second unregister is a no-op
    registry.unregister(&ModuleId::new("editor"));
    assert!(registry.is_empty());
}

#[test]
fn test_reregister_after_unregister_gives_new_instance() {
    let mut registry = ManagerRegistry::new();
    let first = editor_manager("dark");
    registry.register(Rc::clone(&first)).unwrap();
    registry.unregister(&ModuleId::new("editor"));

    let second = editor_manager("light");
    registry.register(Rc::clone(&second)).unwrap();

    let found = registry.get_manager(&editor_key()).unwrap();
    assert!(Rc::ptr_eq(&found, &second));
    assert!(!Rc::ptr_eq(&found, &first));
}

#[test]
fn test_erased_lookup_exposes_snapshot() {
    let mut registry = ManagerRegistry::new();
    registry.register(editor_manager("dark")).unwrap();

    let module = registry.get_erased(&ModuleId::new("editor")).unwrap();
    assert_eq!(
        module.snapshot(),
        Some(serde_json::json!({"theme": "dark", "fontSize": 14}))
    );
}
