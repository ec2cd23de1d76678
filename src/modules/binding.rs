//! Binding between UI-owned state and a module's configuration manager

use crate::error::{AppError, Result};
use crate::modules::{apply_patch, ConfigManager, ConfigPatch, ManagerHost, ModuleConfig, ModuleId, ModuleKey};
use log::{debug, trace};
use std::rc::Rc;

/// UI-local mirror of one module's configuration.
///
/// The mirror is only recomputed on bind, rebind to another module, `update`
/// and `refresh`. Reading [`ConfigBinding::current`] never touches the manager.
pub struct ConfigBinding<T: ModuleConfig> {
    key: ModuleKey<T>,
    manager: Rc<ConfigManager<T>>,
    current: T,
    synced_revision: u64,
}

impl<T: ModuleConfig> ConfigBinding<T> {
    /// Resolve the manager for `key` and mirror its configuration.
    ///
    /// Fails with `UnknownModule` when the module is not registered.
    pub fn bind<H: ManagerHost>(host: &H, key: &ModuleKey<T>) -> Result<Self> {
        let manager = host.get_manager(key)?;
        let current = manager.get_config();
        let synced_revision = manager.revision();
        debug!("Bound UI state to {}", key.id());

        Ok(Self {
            key: key.clone(),
            manager,
            current,
            synced_revision,
        })
    }

    pub fn module_id(&self) -> &ModuleId {
        self.key.id()
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn manager(&self) -> &Rc<ConfigManager<T>> {
        &self.manager
    }

    /// Merge `patch` onto the manager's current value, write it, and mirror
    /// whatever the manager accepted.
    ///
    /// Nothing is written when the patch does not produce a valid value.
    /// Fails with `UnknownModule` once the bound module was torn down, even
    /// if a new manager has since been registered under the same id.
    pub fn update(&mut self, patch: ConfigPatch) -> Result<()> {
        self.ensure_live()?;
        let merged = apply_patch(self.key.id(), &self.manager.get_config(), &patch)?;
        trace!("Updating {} with {} key(s)", self.key.id(), patch.len());
        self.manager.set_config(merged)?;
        self.sync();
        Ok(())
    }

    /// Point the binding at another module. Same id is a no-op while the
    /// bound manager is still live; after a teardown it resolves the
    /// manager registered now.
    ///
    /// On failure the binding keeps its previous module.
    pub fn rebind<H: ManagerHost>(&mut self, host: &H, key: &ModuleKey<T>) -> Result<()> {
        if key.id() == self.key.id() && !self.manager.is_retired() {
            return Ok(());
        }

        *self = Self::bind(host, key)?;
        Ok(())
    }

    /// True when the manager accepted a value this binding has not mirrored,
    /// for example one written through another binding, or when the bound
    /// module was torn down.
    pub fn is_stale(&self) -> bool {
        self.manager.is_retired() || self.manager.revision() != self.synced_revision
    }

    /// Re-read the manager's value into the mirror
    pub fn refresh(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.sync();
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.manager.is_retired() {
            return Err(AppError::UnknownModule(self.key.id().clone()));
        }
        Ok(())
    }

    fn sync(&mut self) {
        self.current = self.manager.get_config();
        self.synced_revision = self.manager.revision();
    }
}
