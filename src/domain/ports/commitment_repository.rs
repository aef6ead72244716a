//! Repository port for commitment persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Commitment;

/// Repository port for commitment rows. One row per (will, member).
#[async_trait]
pub trait CommitmentRepository: Send + Sync {
    async fn create(&self, commitment: &Commitment) -> DomainResult<()>;

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Commitment>>;

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<Commitment>>;

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64>;

    /// Update the text of an existing commitment. Ownership and
    /// immutability windows are enforced by the service layer.
    async fn update(&self, commitment: &Commitment) -> DomainResult<()>;
}
