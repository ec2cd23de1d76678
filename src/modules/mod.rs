//! Module configuration: managers, registry and UI bindings

pub mod binding;
pub mod builtin;
pub mod id;
pub mod manager;
pub mod patch;
pub mod registry;

pub use binding::ConfigBinding;
pub use builtin::ModuleKind;
pub use id::{ModuleConfig, ModuleId, ModuleKey};
pub use manager::{ConfigManager, ManagedModule};
pub use patch::{apply_patch, ConfigPatch};
pub use registry::{ManagerHost, ManagerRegistry};
