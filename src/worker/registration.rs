// Worker registration - which version is active and which is waiting
// Author: kelexine (https://github.com/kelexine)

use super::manager::AssetCacheManager;
use super::state::{ClientMessage, WorkerState};
use crate::error::{Result, WorkerError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
struct Slots {
    active: Option<Arc<AssetCacheManager>>,
    waiting: Option<Arc<AssetCacheManager>>,
}

/// Tracks the active (controlling) and waiting worker versions for a scope.
#[derive(Clone, Default)]
pub struct Registration {
    slots: Arc<RwLock<Slots>>,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `worker`. It takes control at once when nothing is active,
    /// otherwise it waits for `skip_waiting`.
    ///
    /// A failed install leaves the current active worker in control.
    pub async fn register(&self, worker: Arc<AssetCacheManager>) -> Result<WorkerState> {
        worker.on_install().await?;

        let mut slots = self.slots.write().await;
        if slots.active.is_none() {
            worker.on_activate().await?;
            slots.active = Some(worker);
            return Ok(WorkerState::Activated);
        }

        if let Some(previous) = slots.waiting.replace(worker.clone()) {
            debug!("Replacing waiting worker {}", previous.version());
            previous.mark_redundant();
        }
        info!("Worker {} installed and waiting", worker.version());
        Ok(WorkerState::Installed)
    }

    /// Activate the waiting worker now. Returns false when nothing waits.
    pub async fn skip_waiting(&self) -> Result<bool> {
        let mut slots = self.slots.write().await;
        let Some(worker) = slots.waiting.take() else {
            return Ok(false);
        };

        // Retire the old version before the purge so its fetches stop
        // touching partitions that are about to go
        if let Some(previous) = slots.active.as_ref() {
            previous.mark_redundant();
        }
        worker.on_activate().await?;
        slots.active = Some(worker);
        Ok(true)
    }

    /// Deliver a page message to the waiting worker, or the active one.
    pub async fn post_message(&self, message: &ClientMessage) -> Result<bool> {
        let recipient = {
            let slots = self.slots.read().await;
            slots.waiting.clone().or_else(|| slots.active.clone())
        };
        let recipient = recipient.ok_or(WorkerError::NoActiveWorker)?;

        if recipient.on_message(message) && recipient.state() == WorkerState::Installed {
            return self.skip_waiting().await;
        }
        Ok(false)
    }

    /// The worker that receives fetch, push and sync events
    pub async fn active(&self) -> Option<Arc<AssetCacheManager>> {
        self.slots.read().await.active.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<AssetCacheManager>> {
        self.slots.read().await.waiting.clone()
    }
}
