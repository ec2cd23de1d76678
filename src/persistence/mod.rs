pub mod storage;
pub mod worker;

pub use storage::{ConfigStorage, FileStorage, MemoryStorage};
pub use worker::{PersistenceCommand, PersistenceEvent, PersistenceHandle, PersistenceWorker};

#[cfg(any(test, feature = "test-mocks"))]
pub use storage::mocks;
