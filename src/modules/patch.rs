//! Partial configuration updates

use crate::error::{AppError, Result};
use crate::modules::{ModuleConfig, ModuleId};
use serde::Serialize;
use serde_json::{Map, Value};

/// A subset of a configuration's top-level keys.
///
/// Keys use the configuration's serialized field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch(Map<String, Value>);

impl ConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override a key
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Build a patch from a JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AppError::ConfigError(format!(
                "Patch must be an object, got {}",
                other
            ))),
        }
    }

    /// Build a patch from any serializable struct or map
    pub fn from_serialize<S: Serialize>(value: &S) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::ConfigError(format!("Could not serialize patch: {}", e)))?;
        Self::from_value(value)
    }

    /// Keys of `other` override keys of `self`
    pub fn merge(mut self, other: ConfigPatch) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Map<String, Value>> for ConfigPatch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Shallow merge: keys in `patch` replace the same top-level keys of `base`,
/// everything else is kept. The result must deserialize back into `T`.
///
/// A key is unknown when the merged value does not serialize it back. Null
/// is accepted for keys that are skipped when empty, such as unset options.
pub fn apply_patch<T: ModuleConfig>(module: &ModuleId, base: &T, patch: &ConfigPatch) -> Result<T> {
    let invalid = |reason: String| AppError::InvalidPatch {
        module: module.clone(),
        reason,
    };

    let mut fields = match serde_json::to_value(base).map_err(|e| invalid(e.to_string()))? {
        Value::Object(fields) => fields,
        _ => return Err(invalid("configuration does not serialize to an object".to_string())),
    };

    for (key, value) in &patch.0 {
        fields.insert(key.clone(), value.clone());
    }

    let merged: T = serde_json::from_value(Value::Object(fields)).map_err(|e| invalid(e.to_string()))?;

    let written = serde_json::to_value(&merged).map_err(|e| invalid(e.to_string()))?;
    for (key, value) in &patch.0 {
        let kept = written.get(key).is_some();
        if !kept && !value.is_null() {
            return Err(invalid(format!("unknown key '{}'", key)));
        }
    }

    Ok(merged)
}
