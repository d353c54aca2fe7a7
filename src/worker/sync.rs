// Background sync extension point
// Author: kelexine (https://github.com/kelexine)

use crate::error::Result;
use async_trait::async_trait;

/// The operation retried when a background sync event fires.
///
/// The worker runs exactly one sweep per matching sync event and never
/// retries a failed sweep itself.
#[async_trait]
pub trait BackgroundSync: Send + Sync {
    async fn sweep(&self) -> Result<()>;
}

/// Default extension point: nothing is queued, so a sweep does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBackgroundSync;

#[async_trait]
impl BackgroundSync for NoBackgroundSync {
    async fn sweep(&self) -> Result<()> {
        Ok(())
    }
}
