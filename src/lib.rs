//! Module Configuration Kit
//!
//! Configuration managers, a module registry and UI bindings for optional
//! feature modules of a note editor plugin.

pub mod error;
pub mod host;
pub mod logging;
pub mod modules;
pub mod persistence;
pub mod settings;

pub use error::{AppError, ErrorSeverity, Result};
pub use host::ModuleHost;
pub use modules::{ConfigBinding, ConfigManager, ConfigPatch, ManagerHost, ManagerRegistry, ModuleId, ModuleKey};
