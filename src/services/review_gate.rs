//! Review and acknowledgment gating.
//!
//! Tracks per-member review submission and acknowledgment for a Will
//! and answers the two gate questions: may the Will close
//! (`all_reviews_submitted`) and may its members start a new Will
//! (`ready_for_new_will`).

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    display_status, Acknowledgment, FollowThrough, Review, Will, WillStatus,
};
use crate::domain::ports::{
    AcknowledgmentRepository, CommitmentRepository, ReviewRepository, WillRepository,
};

/// True iff every member holding a Commitment on the Will has a
/// Review. Vacuously true with zero commitments. Shared by the gate
/// and the scheduler so the `will_review -> completed` precondition
/// has exactly one definition.
pub async fn all_reviews_submitted(
    commitments: &dyn CommitmentRepository,
    reviews: &dyn ReviewRepository,
    will_id: Uuid,
) -> DomainResult<bool> {
    let committed: HashSet<Uuid> = commitments
        .list_for_will(will_id)
        .await?
        .into_iter()
        .map(|c| c.user_id)
        .collect();
    let reviewed: HashSet<Uuid> = reviews
        .list_for_will(will_id)
        .await?
        .into_iter()
        .map(|r| r.user_id)
        .collect();
    Ok(committed.is_subset(&reviewed))
}

pub struct ReviewGate {
    wills: Arc<dyn WillRepository>,
    commitments: Arc<dyn CommitmentRepository>,
    reviews: Arc<dyn ReviewRepository>,
    acknowledgments: Arc<dyn AcknowledgmentRepository>,
}

impl ReviewGate {
    pub fn new(
        wills: Arc<dyn WillRepository>,
        commitments: Arc<dyn CommitmentRepository>,
        reviews: Arc<dyn ReviewRepository>,
        acknowledgments: Arc<dyn AcknowledgmentRepository>,
    ) -> Self {
        Self { wills, commitments, reviews, acknowledgments }
    }

    /// Record a member's one-time review. Reviews are immutable:
    /// resubmission is rejected, not merged.
    pub async fn submit_review(
        &self,
        will_id: Uuid,
        user_id: Uuid,
        follow_through: FollowThrough,
        reflection: Option<String>,
    ) -> DomainResult<Review> {
        let will = self.get_will(will_id).await?;

        if will.status != WillStatus::WillReview {
            return Err(DomainError::Validation(format!(
                "reviews are only accepted while the will is in review (status is {})",
                will.status.as_str()
            )));
        }
        self.require_commitment(will_id, user_id).await?;

        if self.reviews.get(will_id, user_id).await?.is_some() {
            return Err(DomainError::Validation(
                "review already submitted; reviews are immutable".into(),
            ));
        }

        let review = Review::new(will_id, user_id, follow_through, reflection);
        review.validate()?;
        self.reviews.create(&review).await?;
        Ok(review)
    }

    /// True iff every committed member has reviewed; the sole
    /// precondition for `will_review -> completed`.
    pub async fn all_reviews_submitted(&self, will_id: Uuid) -> DomainResult<bool> {
        all_reviews_submitted(self.commitments.as_ref(), self.reviews.as_ref(), will_id).await
    }

    /// Record that a member has seen the completed Will's summary.
    /// Idempotent: acknowledging twice returns the existing row.
    pub async fn acknowledge(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<Acknowledgment> {
        let will = self.get_will(will_id).await?;

        if will.status != WillStatus::Completed {
            return Err(DomainError::Validation(format!(
                "acknowledgment requires a completed will (status is {})",
                will.status.as_str()
            )));
        }
        self.require_commitment(will_id, user_id).await?;

        if let Some(existing) = self.acknowledgments.get(will_id, user_id).await? {
            return Ok(existing);
        }

        let ack = Acknowledgment::new(will_id, user_id);
        self.acknowledgments.create(&ack).await?;
        Ok(ack)
    }

    /// True iff every commitment has a matching acknowledgment. The
    /// client consults this before unlocking new-Will creation.
    pub async fn ready_for_new_will(&self, will_id: Uuid) -> DomainResult<bool> {
        let commitment_count = self.commitments.count_for_will(will_id).await?;
        let acknowledged_count = self.acknowledgments.count_for_will(will_id).await?;
        Ok(acknowledged_count >= commitment_count)
    }

    /// The status the given member should see: a completed Will stays
    /// `completed` for them until their own acknowledgment lands, no
    /// matter what other members have done.
    pub async fn display_status_for(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<WillStatus> {
        let will = self.get_will(will_id).await?;
        let acked = self.acknowledgments.get(will_id, user_id).await?.is_some();
        Ok(display_status(will.status, acked))
    }

    async fn get_will(&self, id: Uuid) -> DomainResult<Will> {
        self.wills
            .get(id)
            .await?
            .ok_or(DomainError::WillNotFound(id))
    }

    async fn require_commitment(&self, will_id: Uuid, user_id: Uuid) -> DomainResult<()> {
        if self.commitments.get(will_id, user_id).await?.is_none() {
            return Err(DomainError::Authorization(format!(
                "user {user_id} holds no commitment on will {will_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        MemoryAcknowledgmentRepository, MemoryCommitmentRepository, MemoryReviewRepository,
        MemoryWillRepository,
    };
    use crate::domain::models::{Commitment, WillMode};
    use chrono::NaiveDate;

    struct Fixture {
        gate: ReviewGate,
        will: Will,
        members: Vec<Uuid>,
        wills: Arc<MemoryWillRepository>,
    }

    async fn circle_of_three(status: WillStatus) -> Fixture {
        let members: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut will = Will::new(
            "ship the prototype",
            members[0],
            WillMode::Circle,
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
        .with_members(members.clone())
        .with_end_date(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        will.status = status;

        let wills = Arc::new(MemoryWillRepository::default());
        wills.insert(will.clone());
        let commitments = Arc::new(MemoryCommitmentRepository::default());
        for m in &members {
            commitments
                .create(&Commitment::new(will.id, *m, "do the thing", "because"))
                .await
                .unwrap();
        }

        let gate = ReviewGate::new(
            wills.clone(),
            commitments,
            Arc::new(MemoryReviewRepository::default()),
            Arc::new(MemoryAcknowledgmentRepository::default()),
        );
        Fixture { gate, will, members, wills }
    }

    #[tokio::test]
    async fn test_gate_closes_only_after_every_review() {
        let f = circle_of_three(WillStatus::WillReview).await;

        for member in &f.members[..2] {
            f.gate
                .submit_review(f.will.id, *member, FollowThrough::Yes, None)
                .await
                .unwrap();
        }
        assert!(!f.gate.all_reviews_submitted(f.will.id).await.unwrap());

        f.gate
            .submit_review(f.will.id, f.members[2], FollowThrough::Mostly, None)
            .await
            .unwrap();
        assert!(f.gate.all_reviews_submitted(f.will.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_review_rejected_outside_review_state() {
        let f = circle_of_three(WillStatus::Active).await;
        let err = f
            .gate
            .submit_review(f.will.id, f.members[0], FollowThrough::Yes, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duplicate_review_rejected() {
        let f = circle_of_three(WillStatus::WillReview).await;
        f.gate
            .submit_review(f.will.id, f.members[0], FollowThrough::Yes, None)
            .await
            .unwrap();
        let err = f
            .gate
            .submit_review(f.will.id, f.members[0], FollowThrough::No, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_uncommitted_reviewer_rejected() {
        let f = circle_of_three(WillStatus::WillReview).await;
        let err = f
            .gate
            .submit_review(f.will.id, Uuid::new_v4(), FollowThrough::Yes, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_readiness_requires_every_acknowledgment() {
        let f = circle_of_three(WillStatus::Completed).await;

        for member in &f.members[..2] {
            f.gate.acknowledge(f.will.id, *member).await.unwrap();
        }
        assert!(!f.gate.ready_for_new_will(f.will.id).await.unwrap());

        f.gate.acknowledge(f.will.id, f.members[2]).await.unwrap();
        assert!(f.gate.ready_for_new_will(f.will.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_acknowledge_is_idempotent() {
        let f = circle_of_three(WillStatus::Completed).await;
        let first = f.gate.acknowledge(f.will.id, f.members[0]).await.unwrap();
        let second = f.gate.acknowledge(f.will.id, f.members[0]).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_acknowledge_requires_completed() {
        let f = circle_of_three(WillStatus::WillReview).await;
        let err = f.gate.acknowledge(f.will.id, f.members[0]).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_display_stays_completed_until_own_acknowledgment() {
        let f = circle_of_three(WillStatus::Completed).await;

        // two other members acknowledge; the third still sees completed
        f.gate.acknowledge(f.will.id, f.members[0]).await.unwrap();
        f.gate.acknowledge(f.will.id, f.members[1]).await.unwrap();

        assert_eq!(
            f.gate.display_status_for(f.will.id, f.members[2]).await.unwrap(),
            WillStatus::Completed
        );
        assert_eq!(
            f.gate.display_status_for(f.will.id, f.members[0]).await.unwrap(),
            WillStatus::Archived
        );

        // persisted status is untouched by any of this
        let stored = f.wills.get(f.will.id).await.unwrap().unwrap();
        assert_eq!(stored.status, WillStatus::Completed);
    }
}
