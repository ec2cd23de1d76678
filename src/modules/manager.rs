//! Per-module configuration manager

use crate::error::{AppError, Result};
use crate::modules::{ModuleConfig, ModuleId};
use crate::persistence::PersistenceHandle;
use log::{debug, warn};
use serde_json::Value;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Owns the configuration of exactly one module.
///
/// Lives on the UI thread. `set_config` replaces the value and hands a copy
/// to the persistence worker without waiting for it. Once the registry
/// retires the manager it rejects every write.
pub struct ConfigManager<T: ModuleConfig> {
    id: ModuleId,
    current: RefCell<T>,
    revision: Cell<u64>,
    retired: Cell<bool>,
    persistence: Option<PersistenceHandle>,
}

impl<T: ModuleConfig> ConfigManager<T> {
    pub fn new(id: impl Into<ModuleId>, initial: T) -> Self {
        Self {
            id: id.into(),
            current: RefCell::new(initial.normalize()),
            revision: Cell::new(0),
            retired: Cell::new(false),
            persistence: None,
        }
    }

    /// Write every accepted value through `handle`
    pub fn with_persistence(mut self, handle: PersistenceHandle) -> Self {
        self.persistence = Some(handle);
        self
    }

    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    pub fn get_config(&self) -> T {
        self.current.borrow().clone()
    }

    /// Replace the value. Fails with `UnknownModule` once the module was
    /// torn down; nothing is stored or persisted in that case.
    pub fn set_config(&self, next: T) -> Result<()> {
        if self.is_retired() {
            warn!("Rejected write to torn down module {}", self.id);
            return Err(AppError::UnknownModule(self.id.clone()));
        }

        let next = next.normalize();
        debug!("Replacing configuration of {}", self.id);
        *self.current.borrow_mut() = next;
        self.revision.set(self.revision.get() + 1);
        self.persist();
        Ok(())
    }

    /// True after the registry unregistered this manager
    pub fn is_retired(&self) -> bool {
        self.retired.get()
    }

    /// Number of values accepted since creation
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    fn persist(&self) {
        let Some(handle) = &self.persistence else {
            return;
        };

        let value = match serde_json::to_value(&*self.current.borrow()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not serialize configuration of {}: {}", self.id, e);
                return;
            }
        };

        if let Err(e) = handle.enqueue(self.id.clone(), value) {
            warn!("{}", e);
        }
    }
}

/// Type-erased view of a manager, as stored in the registry
pub trait ManagedModule {
    fn module_id(&self) -> &ModuleId;
    fn config_type(&self) -> &'static str;
    fn snapshot(&self) -> Option<Value>;
    /// Mark the manager as torn down
    fn retire(&self);
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: ModuleConfig> ManagedModule for ConfigManager<T> {
    fn module_id(&self) -> &ModuleId {
        &self.id
    }

    fn config_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn snapshot(&self) -> Option<Value> {
        serde_json::to_value(&*self.current.borrow()).ok()
    }

    fn retire(&self) {
        self.retired.set(true);
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
