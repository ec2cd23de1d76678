//! Background thread that writes configuration values to storage

use crate::error::{AppError, Result};
use crate::modules::ModuleId;
use crate::persistence::ConfigStorage;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Commands sent to the persistence thread
#[derive(Debug)]
pub enum PersistenceCommand {
    /// Store a module's latest value
    Write { module: ModuleId, value: Value },
    /// Acknowledge once every earlier command has been handled
    Flush(Sender<()>),
    /// Stop the thread after pending writes
    Shutdown,
}

/// Events sent back from the persistence thread
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceEvent {
    Written { module: ModuleId },
    WriteFailed { module: ModuleId, reason: String },
    Shutdown,
}

impl PersistenceEvent {
    /// The warning carried by a failed write
    pub fn into_error(self) -> Option<AppError> {
        match self {
            PersistenceEvent::WriteFailed { module, reason } => {
                Some(AppError::PersistenceWrite { module, reason })
            }
            _ => None,
        }
    }
}

/// Cloneable sender side given to configuration managers
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    command_tx: Sender<PersistenceCommand>,
}

impl PersistenceHandle {
    /// Queue a write without waiting for it
    pub fn enqueue(&self, module: ModuleId, value: Value) -> Result<()> {
        self.command_tx
            .send(PersistenceCommand::Write {
                module: module.clone(),
                value,
            })
            .map_err(|_| AppError::PersistenceWrite {
                module,
                reason: "persistence worker is not running".to_string(),
            })
    }
}

/// Persistence worker running in a background thread
pub struct PersistenceWorker {
    command_tx: Sender<PersistenceCommand>,
    event_rx: Receiver<PersistenceEvent>,
    thread_handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    /// Spawn the worker thread over `storage`
    pub fn start(storage: Arc<dyn ConfigStorage>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread_handle = thread::Builder::new()
            .name("config-persistence".to_string())
            .spawn(move || {
                persistence_thread(storage, command_rx, event_tx);
            })?;

        Ok(Self {
            command_tx,
            event_rx,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn handle(&self) -> PersistenceHandle {
        PersistenceHandle {
            command_tx: self.command_tx.clone(),
        }
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<PersistenceEvent> {
        self.event_rx.try_recv().ok()
    }

    /// All events received so far
    pub fn drain_events(&self) -> Vec<PersistenceEvent> {
        self.event_rx.try_iter().collect()
    }

    /// Block until every write queued before this call has been attempted
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.command_tx.send(PersistenceCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Shutdown the worker, finishing queued writes first
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = self.command_tx.send(PersistenceCommand::Shutdown);
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle.is_some()
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn persistence_thread(
    storage: Arc<dyn ConfigStorage>,
    command_rx: Receiver<PersistenceCommand>,
    event_tx: Sender<PersistenceEvent>,
) {
    info!("Persistence thread started");

    // Blocks until a command arrives; ends when every sender is gone
    for command in command_rx.iter() {
        match command {
            PersistenceCommand::Write { module, value } => match storage.save(&module, &value) {
                Ok(()) => {
                    debug!("Persisted configuration for {}", module);
                    let _ = event_tx.send(PersistenceEvent::Written { module });
                }
                Err(e) => {
                    warn!("Keeping in-memory configuration for {}: {}", module, e);
                    let _ = event_tx.send(PersistenceEvent::WriteFailed {
                        module,
                        reason: e.to_string(),
                    });
                }
            },
            PersistenceCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            PersistenceCommand::Shutdown => {
                info!("Persistence thread received shutdown command");
                let _ = event_tx.send(PersistenceEvent::Shutdown);
                break;
            }
        }
    }

    info!("Persistence thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::mocks::FailingStorage;
    use crate::persistence::MemoryStorage;
    use serde_json::json;

    #[test]
    fn test_writes_reach_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let worker = PersistenceWorker::start(storage.clone()).unwrap();
        let id = ModuleId::new("editor");

        worker.handle().enqueue(id.clone(), json!({"fontSize": 16})).unwrap();
        worker.flush();

        assert_eq!(storage.get(&id), Some(json!({"fontSize": 16})));
        assert_eq!(worker.drain_events(), vec![PersistenceEvent::Written { module: id }]);
    }

    #[test]
    fn test_failures_are_reported_as_events() {
        let storage = Arc::new(FailingStorage::default());
        let worker = PersistenceWorker::start(storage.clone()).unwrap();

        worker.handle().enqueue(ModuleId::new("editor"), json!({})).unwrap();
        worker.flush();

        let event = worker.try_recv_event().unwrap();
        assert!(matches!(
            event.into_error(),
            Some(AppError::PersistenceWrite { .. })
        ));
        assert_eq!(storage.attempts(), 1);
    }

    #[test]
    fn test_enqueue_after_shutdown_fails() {
        let mut worker = PersistenceWorker::start(Arc::new(MemoryStorage::new())).unwrap();
        let handle = worker.handle();
        worker.shutdown();

        assert!(!worker.is_running());
        assert!(handle.enqueue(ModuleId::new("editor"), json!({})).is_err());
    }
}
