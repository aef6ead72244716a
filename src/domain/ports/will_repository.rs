//! Repository port for Will persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{EndRoomStatus, Will, WillMode, WillStatus};

/// Filters for querying Wills.
#[derive(Default, Debug, Clone)]
pub struct WillFilter {
    pub status: Option<WillStatus>,
    pub member_id: Option<Uuid>,
    pub mode: Option<WillMode>,
}

/// Repository port for Will rows.
///
/// `compare_and_set_status` is the scheduler's only status write path:
/// a per-row conditional update so overlapping ticks degrade to no-ops
/// instead of double-applying a transition.
#[async_trait]
pub trait WillRepository: Send + Sync {
    async fn create(&self, will: &Will) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Will>>;

    /// Full-row update guarded by `version`: callers bump the version
    /// before writing, and the write is rejected with `Conflict` when
    /// the stored row no longer matches the caller's snapshot.
    async fn update(&self, will: &Will) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    async fn list(&self, filter: WillFilter) -> DomainResult<Vec<Will>>;

    /// Every Will the scheduler still needs to look at.
    async fn list_non_terminal(&self) -> DomainResult<Vec<Will>>;

    /// Conditionally move `status` from `expected` to `next`.
    /// Returns false (not an error) when the row no longer holds
    /// `expected` — the caller lost the race and retries next tick.
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: WillStatus,
        next: WillStatus,
    ) -> DomainResult<bool>;

    /// Refresh the cached End Room status.
    async fn set_end_room_status(&self, id: Uuid, status: EndRoomStatus) -> DomainResult<()>;
}
