//! Durable storage backends for module configurations

use crate::error::{AppError, Result};
use crate::modules::ModuleId;
use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Where module configurations live between sessions.
///
/// Called from the persistence worker thread, hence `Send + Sync`.
pub trait ConfigStorage: Send + Sync {
    /// Stored value for `module`, or `None` if nothing was saved yet
    fn load(&self, module: &ModuleId) -> Result<Option<Value>>;

    fn save(&self, module: &ModuleId, value: &Value) -> Result<()>;
}

/// One TOML file per module in a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `module`. Ids are restricted so they cannot escape the directory.
    pub fn path_for(&self, module: &ModuleId) -> Result<PathBuf> {
        let valid = !module.as_str().is_empty()
            && module
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::ConfigError(format!(
                "Module id '{}' cannot be used as a file name",
                module
            )));
        }
        Ok(self.dir.join(format!("{}.toml", module)))
    }
}

impl ConfigStorage for FileStorage {
    fn load(&self, module: &ModuleId) -> Result<Option<Value>> {
        let path = self.path_for(module)?;
        if !path.exists() {
            debug!("No stored configuration for {}", module);
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::ConfigError(format!("Could not read {:?}: {}", path, e)))?;
        let value: Value = toml::from_str(&content)?;

        info!("Loaded configuration for {} from {:?}", module, path);
        Ok(Some(value))
    }

    fn save(&self, module: &ModuleId, value: &Value) -> Result<()> {
        let path = self.path_for(module)?;
        fs::create_dir_all(&self.dir)?;

        // TOML has no null; unset optional fields are written as absent keys
        let content = toml::to_string_pretty(&strip_nulls(value))?;
        fs::write(&path, content).map_err(|e| AppError::PersistenceWrite {
            module: module.clone(),
            reason: format!("{:?}: {}", path, e),
        })?;

        debug!("Saved configuration for {} to {:?}", module, path);
        Ok(())
    }
}

fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}

/// Keeps values in memory; used when the host does not persist
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<ModuleId, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored value, as if saved by an earlier session
    pub fn with_value(self, module: impl Into<ModuleId>, value: Value) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(module.into(), value);
        }
        self
    }

    pub fn get(&self, module: &ModuleId) -> Option<Value> {
        self.values.lock().ok()?.get(module).cloned()
    }
}

impl ConfigStorage for MemoryStorage {
    fn load(&self, module: &ModuleId) -> Result<Option<Value>> {
        Ok(self.get(module))
    }

    fn save(&self, module: &ModuleId, value: &Value) -> Result<()> {
        let mut values = self.values.lock().map_err(|e| AppError::PersistenceWrite {
            module: module.clone(),
            reason: e.to_string(),
        })?;
        values.insert(module.clone(), value.clone());
        Ok(())
    }
}

/// Mock implementations for testing
/// Available in tests and with the "test-mocks" feature
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Every save fails; loads return nothing
    #[derive(Default)]
    pub struct FailingStorage {
        pub attempts: AtomicUsize,
    }

    impl FailingStorage {
        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl ConfigStorage for FailingStorage {
        fn load(&self, _module: &ModuleId) -> Result<Option<Value>> {
            Ok(None)
        }

        fn save(&self, module: &ModuleId, _value: &Value) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(AppError::PersistenceWrite {
                module: module.clone(),
                reason: "storage is read-only".to_string(),
            })
        }
    }

    /// Loads always fail, as with a corrupt store
    pub struct UnreadableStorage;

    impl ConfigStorage for UnreadableStorage {
        fn load(&self, module: &ModuleId) -> Result<Option<Value>> {
            Err(AppError::ConfigError(format!("Stored value for {} is corrupt", module)))
        }

        fn save(&self, _module: &ModuleId, _value: &Value) -> Result<()> {
            Ok(())
        }
    }
}
