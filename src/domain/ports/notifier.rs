//! Transition notification port.
//!
//! The scheduler fires one notice per observed status transition.
//! Delivery is fire-and-forget: downstream failures are the notifier's
//! problem and never roll back the transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::WillStatus;

/// Payload describing one observed status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionNotice {
    pub will_id: Uuid,
    pub old_status: WillStatus,
    pub new_status: WillStatus,
    pub occurred_at: DateTime<Utc>,
}

#[async_trait]
pub trait TransitionNotifier: Send + Sync {
    async fn notify(&self, notice: TransitionNotice);
}

/// Notifier that logs transitions through tracing. The default wiring
/// for deployments without a push/email integration.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl TransitionNotifier for LoggingNotifier {
    async fn notify(&self, notice: TransitionNotice) {
        tracing::info!(
            will_id = %notice.will_id,
            old_status = notice.old_status.as_str(),
            new_status = notice.new_status.as_str(),
            "will transitioned"
        );
    }
}

/// Notifier that drops everything. Useful in tests that don't assert
/// on notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl TransitionNotifier for NullNotifier {
    async fn notify(&self, _notice: TransitionNotice) {}
}
