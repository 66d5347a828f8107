use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use service::resource_lock::ResourceLockService;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;
use uuid::Uuid;

/// In-process advisory locks, one per resource.
#[derive(Default)]
pub struct ResourceLockServiceImpl {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ResourceLockServiceImpl {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceLockService for ResourceLockServiceImpl {
    type Guard = OwnedMutexGuard<()>;

    async fn lock(&self, resource_id: Uuid) -> Self::Guard {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Nobody holds or waits for locks with a single reference.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(resource_id).or_default().clone()
        };
        trace!(%resource_id, "Waiting for resource lock");
        lock.lock_owned().await
    }
}
