//! Repository port for check-in persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::CheckIn;

/// Repository port for check-in rows.
///
/// The (will_id, date) pair is unique; `upsert` overwrites the status
/// for an existing date rather than appending a second row.
#[async_trait]
pub trait CheckInRepository: Send + Sync {
    /// Insert or overwrite the check-in for (will_id, date).
    /// Returns the stored row.
    async fn upsert(&self, check_in: &CheckIn) -> DomainResult<CheckIn>;

    async fn get(&self, will_id: Uuid, date: NaiveDate) -> DomainResult<Option<CheckIn>>;

    /// All check-ins for a Will in ascending date order.
    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<CheckIn>>;

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64>;
}
