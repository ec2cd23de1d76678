//! Module identifiers and typed configuration keys

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Opaque identifier of a module, unique within a running plugin instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(Cow<'static, str>);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

/// A module's configuration value.
///
/// Values are replaced wholesale, never mutated in place. `normalize` runs on
/// every value a manager accepts and is where a module clamps or rewrites
/// fields; the generic layer never inspects the shape.
pub trait ModuleConfig:
    Clone + PartialEq + fmt::Debug + Default + Serialize + DeserializeOwned + 'static
{
    fn normalize(self) -> Self {
        self
    }
}

/// A module id that also names the configuration type its manager holds
pub struct ModuleKey<T> {
    id: ModuleId,
    _config: PhantomData<fn() -> T>,
}

impl<T> ModuleKey<T> {
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            _config: PhantomData,
        }
    }

    pub const fn from_static(id: &'static str) -> Self {
        Self {
            id: ModuleId::from_static(id),
            _config: PhantomData,
        }
    }

    pub fn id(&self) -> &ModuleId {
        &self.id
    }
}

impl<T> Clone for ModuleKey<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            _config: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ModuleKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleKey")
            .field("id", &self.id)
            .field("config", &std::any::type_name::<T>())
            .finish()
    }
}
