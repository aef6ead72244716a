//! Repository ports for reviews and acknowledgments.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Acknowledgment, Review};

/// Repository port for review rows. One per (will, member), immutable
/// after creation, so there is no update method.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: &Review) -> DomainResult<()>;

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Review>>;

    async fn list_for_will(&self, will_id: Uuid) -> DomainResult<Vec<Review>>;

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64>;
}

/// Repository port for acknowledgment rows. One per (will, member).
#[async_trait]
pub trait AcknowledgmentRepository: Send + Sync {
    async fn create(&self, ack: &Acknowledgment) -> DomainResult<()>;

    async fn get(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Option<Acknowledgment>>;

    async fn count_for_will(&self, will_id: Uuid) -> DomainResult<u64>;
}
