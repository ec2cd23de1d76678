//! The host plugin: owns the registry and module lifecycles

use crate::error::{AppError, Result};
use crate::modules::builtin::{CALLOUT_CARDS, CODE_BLOCK, EDITOR};
use crate::modules::{
    ConfigManager, ManagedModule, ManagerHost, ManagerRegistry, ModuleConfig, ModuleId, ModuleKey,
    ModuleKind,
};
use crate::persistence::{ConfigStorage, PersistenceEvent, PersistenceWorker};
use crate::settings::PluginSettings;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

/// A running plugin instance.
///
/// The registry exists between `activate` and `deactivate`; managers are
/// created by `enable` and dropped by `disable` or deactivation.
pub struct ModuleHost {
    settings: PluginSettings,
    storage: Arc<dyn ConfigStorage>,
    registry: ManagerRegistry,
    worker: Option<PersistenceWorker>,
    active: bool,
}

impl ModuleHost {
    pub fn new(settings: PluginSettings, storage: Arc<dyn ConfigStorage>) -> Self {
        Self {
            settings,
            storage,
            registry: ManagerRegistry::new(),
            worker: None,
            active: false,
        }
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ManagerRegistry {
        &self.registry
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start persistence and enable every module listed in the settings.
    ///
    /// Repeated ids are skipped. If any module fails to enable, the plugin
    /// is left inactive with no managers and no worker.
    pub fn activate(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }

        if self.settings.persistence.enabled {
            self.worker = Some(PersistenceWorker::start(Arc::clone(&self.storage))?);
        } else {
            info!("Persistence disabled, module configurations stay in memory");
        }
        self.active = true;

        if let Err(e) = self.enable_listed_modules() {
            warn!("Activation failed, rolling back: {}", e);
            self.deactivate();
            return Err(e);
        }

        info!("Plugin activated with {} module(s)", self.registry.len());
        Ok(())
    }

    fn enable_listed_modules(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for id in self.settings.general.enabled_modules.clone() {
            if !seen.insert(id.clone()) {
                warn!("Module '{}' listed more than once in settings", id);
                continue;
            }
            match ModuleKind::from_id(id.as_str()) {
                Some(kind) => self.enable_kind(kind)?,
                None => warn!("Ignoring unknown module '{}' in settings", id),
            }
        }
        Ok(())
    }

    /// Unregister every manager and stop persistence after pending writes
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }

        self.registry.clear();
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
        self.active = false;
        info!("Plugin deactivated");
    }

    pub fn enable_kind(&mut self, kind: ModuleKind) -> Result<()> {
        match kind {
            ModuleKind::Editor => self.enable(&EDITOR).map(|_| ()),
            ModuleKind::CodeBlock => self.enable(&CODE_BLOCK).map(|_| ()),
            ModuleKind::CalloutCards => self.enable(&CALLOUT_CARDS).map(|_| ()),
        }
    }

    /// Create and register the manager for `key`, starting from the stored
    /// value or the module defaults.
    pub fn enable<T: ModuleConfig>(&mut self, key: &ModuleKey<T>) -> Result<Rc<ConfigManager<T>>> {
        if !self.active {
            return Err(AppError::ConfigError(format!(
                "Cannot enable {} while the plugin is inactive",
                key.id()
            )));
        }
        if self.registry.contains(key.id()) {
            return Err(AppError::DuplicateModule(key.id().clone()));
        }

        let initial = self.load_stored(key.id());
        let mut manager = ConfigManager::new(key.id().clone(), initial);
        if let Some(worker) = &self.worker {
            manager = manager.with_persistence(worker.handle());
        }

        let manager = Rc::new(manager);
        self.registry.register(Rc::clone(&manager))?;
        info!("Enabled module {}", key.id());
        Ok(manager)
    }

    /// Tear down the module's manager; unknown ids are ignored
    pub fn disable(&mut self, id: &ModuleId) {
        if self.registry.contains(id) {
            info!("Disabling module {}", id);
        }
        self.registry.unregister(id);
    }

    pub fn module(&self, id: &ModuleId) -> Result<Rc<dyn ManagedModule>> {
        self.registry.get_erased(id)
    }

    /// Block until queued configuration writes have been attempted
    pub fn flush_persistence(&self) {
        if let Some(worker) = &self.worker {
            worker.flush();
        }
    }

    /// Persistence outcomes reported since the last call
    pub fn persistence_events(&self) -> Vec<PersistenceEvent> {
        self.worker
            .as_ref()
            .map(PersistenceWorker::drain_events)
            .unwrap_or_default()
    }

    fn load_stored<T: ModuleConfig>(&self, id: &ModuleId) -> T {
        match self.storage.load(id) {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Stored configuration for {} is invalid, using defaults: {}", id, e);
                    T::default()
                }
            },
            Ok(None) => {
                debug!("No stored configuration for {}, using defaults", id);
                T::default()
            }
            Err(e) => {
                warn!("Could not load configuration for {}, using defaults: {}", id, e);
                T::default()
            }
        }
    }
}

impl ManagerHost for ModuleHost {
    fn register<T: ModuleConfig>(&mut self, manager: Rc<ConfigManager<T>>) -> Result<()> {
        self.registry.register(manager)
    }

    fn get_manager<T: ModuleConfig>(&self, key: &ModuleKey<T>) -> Result<Rc<ConfigManager<T>>> {
        self.registry.get_manager(key)
    }

    fn unregister(&mut self, id: &ModuleId) {
        self.disable(id)
    }
}

impl Drop for ModuleHost {
    fn drop(&mut self) {
        self.deactivate();
    }
}
