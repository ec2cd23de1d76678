//! Registry of live configuration managers

use crate::error::{AppError, Result};
use crate::modules::{ConfigManager, ManagedModule, ModuleConfig, ModuleId, ModuleKey};
use log::{debug, info};
use std::collections::HashMap;
use std::rc::Rc;

/// Lookup surface the host plugin exposes to bindings
pub trait ManagerHost {
    /// Register a manager under its own module id
    fn register<T: ModuleConfig>(&mut self, manager: Rc<ConfigManager<T>>) -> Result<()>;

    /// Resolve the manager for `key`; never creates one
    fn get_manager<T: ModuleConfig>(&self, key: &ModuleKey<T>) -> Result<Rc<ConfigManager<T>>>;

    /// Drop and retire the manager for `id`, if any
    fn unregister(&mut self, id: &ModuleId);
}

/// Maps each active module id to the one manager that owns its configuration
#[derive(Default)]
pub struct ManagerRegistry {
    managers: HashMap<ModuleId, Rc<dyn ManagedModule>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.managers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Registered ids in sorted order
    pub fn module_ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<ModuleId> = self.managers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Type-erased lookup, for hosts that only know the id
    pub fn get_erased(&self, id: &ModuleId) -> Result<Rc<dyn ManagedModule>> {
        self.managers
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownModule(id.clone()))
    }

    /// Unregister and retire every manager
    pub fn clear(&mut self) {
        if !self.managers.is_empty() {
            info!("Unregistering {} module manager(s)", self.managers.len());
        }
        for (_, manager) in self.managers.drain() {
            manager.retire();
        }
    }
}

impl ManagerHost for ManagerRegistry {
    fn register<T: ModuleConfig>(&mut self, manager: Rc<ConfigManager<T>>) -> Result<()> {
        let id = manager.id().clone();
        if self.managers.contains_key(&id) {
            return Err(AppError::DuplicateModule(id));
        }

        debug!("Registered manager for {}", id);
        self.managers.insert(id, manager);
        Ok(())
    }

    fn get_manager<T: ModuleConfig>(&self, key: &ModuleKey<T>) -> Result<Rc<ConfigManager<T>>> {
        let entry = self.get_erased(key.id())?;
        entry
            .into_any()
            .downcast::<ConfigManager<T>>()
            .map_err(|_| AppError::ModuleTypeMismatch {
                module: key.id().clone(),
                expected: std::any::type_name::<T>(),
            })
    }

    fn unregister(&mut self, id: &ModuleId) {
        if let Some(manager) = self.managers.remove(id) {
            manager.retire();
            debug!("Unregistered manager for {}", id);
        }
    }
}
