use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

/// Advisory lock serializing the saves of bookings of one resource.
#[automock(type Guard = ();)]
#[async_trait]
pub trait ResourceLockService {
    /// Released when dropped.
    type Guard: Send;

    async fn lock(&self, resource_id: Uuid) -> Self::Guard;
}
