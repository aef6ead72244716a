//! Will creation, commitments, and administrative lifecycle actions.
//!
//! Everything here is member- or operator-initiated; the scheduler owns
//! the time-driven transitions. Authorization rules live in this layer:
//! a member may only touch their own commitment, and only the creator
//! may edit, archive, or delete a Will.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ActiveDays, CheckInType, Commitment, Visibility, Will, WillMode, WillStatus,
};
use crate::domain::ports::{Clock, CommitmentRepository, WillRepository};

/// Creation parameters shared by solo and circle Wills.
#[derive(Debug, Clone)]
pub struct WillDraft {
    pub title: String,
    pub visibility: Visibility,
    pub start_date: NaiveDate,
    /// None makes the Will indefinite.
    pub end_date: Option<NaiveDate>,
    pub active_days: ActiveDays,
    pub check_in_type: CheckInType,
    pub end_room_scheduled_at: Option<DateTime<Utc>>,
    pub timezone_offset_minutes: i32,
}

pub struct WillService {
    wills: Arc<dyn WillRepository>,
    commitments: Arc<dyn CommitmentRepository>,
    clock: Arc<dyn Clock>,
}

impl WillService {
    pub fn new(
        wills: Arc<dyn WillRepository>,
        commitments: Arc<dyn CommitmentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { wills, commitments, clock }
    }

    /// Create a solo Will with the creator's commitment bundled. Solo
    /// Wills skip `pending` entirely: they are born `scheduled`, or
    /// `active` when the start date has already arrived.
    pub async fn create_solo(
        &self,
        creator: Uuid,
        draft: WillDraft,
        what: impl Into<String>,
        why: impl Into<String>,
    ) -> DomainResult<Will> {
        let mut will = Self::from_draft(creator, WillMode::Solo, &draft);
        let today = will.local_today(self.clock.now());
        will.status = if will.start_date <= today {
            WillStatus::Active
        } else {
            WillStatus::Scheduled
        };
        will.validate()?;

        let commitment = Commitment::new(will.id, creator, what, why);
        commitment.validate()?;

        self.wills.create(&will).await?;
        self.commitments.create(&commitment).await?;
        Ok(will)
    }

    /// Create a circle Will in `pending`, awaiting a commitment from
    /// every member before the scheduler moves it forward.
    pub async fn create_circle(
        &self,
        creator: Uuid,
        member_ids: Vec<Uuid>,
        draft: WillDraft,
    ) -> DomainResult<Will> {
        let will = Self::from_draft(creator, WillMode::Circle, &draft).with_members(member_ids);
        will.validate()?;
        self.wills.create(&will).await?;
        Ok(will)
    }

    /// Declare a member's commitment. Only valid while the Will is
    /// still pending or scheduled, and only once per member.
    pub async fn submit_commitment(
        &self,
        will_id: Uuid,
        user_id: Uuid,
        what: impl Into<String>,
        why: impl Into<String>,
    ) -> DomainResult<Commitment> {
        let will = self.get_will(will_id).await?;

        if !will.is_member(user_id) {
            return Err(DomainError::Authorization(format!(
                "user {user_id} is not a member of will {will_id}"
            )));
        }
        if !will.commitments_mutable() {
            return Err(DomainError::Validation(format!(
                "commitments are locked once the will leaves scheduling (status is {})",
                will.status.as_str()
            )));
        }
        if self.commitments.get(will_id, user_id).await?.is_some() {
            return Err(DomainError::Validation(
                "commitment already declared for this member".into(),
            ));
        }

        let commitment = Commitment::new(will_id, user_id, what, why);
        commitment.validate()?;
        self.commitments.create(&commitment).await?;
        Ok(commitment)
    }

    /// Edit a commitment's text. `actor` must be the declaring member;
    /// edits stop once the Will starts moving.
    pub async fn update_commitment(
        &self,
        will_id: Uuid,
        owner: Uuid,
        actor: Uuid,
        what: impl Into<String>,
        why: impl Into<String>,
    ) -> DomainResult<Commitment> {
        if owner != actor {
            return Err(DomainError::Authorization(
                "a commitment is owned exclusively by its declaring member".into(),
            ));
        }
        let will = self.get_will(will_id).await?;
        if !will.commitments_mutable() {
            return Err(DomainError::Validation(format!(
                "commitments are immutable once the will leaves scheduling (status is {})",
                will.status.as_str()
            )));
        }

        let mut commitment = self
            .commitments
            .get(will_id, owner)
            .await?
            .ok_or_else(|| {
                DomainError::Validation("no commitment declared for this member".into())
            })?;
        commitment.what = what.into();
        commitment.why = why.into();
        commitment.updated_at = self.clock.now();
        commitment.validate()?;
        self.commitments.update(&commitment).await?;
        Ok(commitment)
    }

    /// Administrative pause; any member of the Will may pause it.
    pub async fn pause(&self, will_id: Uuid, actor: Uuid) -> DomainResult<Will> {
        let mut will = self.get_member_will(will_id, actor).await?;
        will.pause(self.clock.now())?;
        self.wills.update(&will).await?;
        Ok(will)
    }

    /// Resume a paused Will to the status it was paused from.
    pub async fn resume(&self, will_id: Uuid, actor: Uuid) -> DomainResult<Will> {
        let mut will = self.get_member_will(will_id, actor).await?;
        will.resume(self.clock.now())?;
        self.wills.update(&will).await?;
        Ok(will)
    }

    /// Explicit member action ending the Will. The only way out of
    /// `active` for an indefinite Will.
    pub async fn terminate(&self, will_id: Uuid, actor: Uuid) -> DomainResult<Will> {
        let mut will = self.get_member_will(will_id, actor).await?;
        will.transition_to(WillStatus::Terminated, self.clock.now())?;
        self.wills.update(&will).await?;
        Ok(will)
    }

    /// Creator-only administrative close of a completed Will.
    pub async fn archive(&self, will_id: Uuid, actor: Uuid) -> DomainResult<Will> {
        let mut will = self.get_will(will_id).await?;
        if will.created_by != actor {
            return Err(DomainError::Authorization(
                "only the creator may archive a will".into(),
            ));
        }
        will.transition_to(WillStatus::Archived, self.clock.now())?;
        self.wills.update(&will).await?;
        Ok(will)
    }

    /// Creator-only edits to the descriptive fields. Scheduling fields
    /// are fixed at creation; title and visibility may change at any
    /// point before a terminal state.
    pub async fn update_will(
        &self,
        will_id: Uuid,
        actor: Uuid,
        title: Option<String>,
        visibility: Option<Visibility>,
    ) -> DomainResult<Will> {
        let mut will = self.get_will(will_id).await?;
        if will.created_by != actor {
            return Err(DomainError::Authorization(
                "only the creator may edit a will".into(),
            ));
        }
        if will.is_terminal() {
            return Err(DomainError::Validation(format!(
                "a {} will cannot be edited",
                will.status.as_str()
            )));
        }

        if let Some(title) = title {
            will.title = title;
        }
        if let Some(visibility) = visibility {
            will.visibility = visibility;
        }
        will.updated_at = self.clock.now();
        will.version += 1;
        will.validate()?;
        self.wills.update(&will).await?;
        Ok(will)
    }

    /// Creator-only deletion, and only before the Will goes active.
    pub async fn delete(&self, will_id: Uuid, actor: Uuid) -> DomainResult<()> {
        let will = self.get_will(will_id).await?;
        if will.created_by != actor {
            return Err(DomainError::Authorization(
                "only the creator may delete a will".into(),
            ));
        }
        if !will.commitments_mutable() {
            return Err(DomainError::Validation(format!(
                "a will cannot be deleted once it has started (status is {})",
                will.status.as_str()
            )));
        }
        self.wills.delete(will_id).await
    }

    pub async fn get(&self, will_id: Uuid) -> DomainResult<Will> {
        self.get_will(will_id).await
    }

    fn from_draft(creator: Uuid, mode: WillMode, draft: &WillDraft) -> Will {
        let mut will = Will::new(draft.title.clone(), creator, mode, draft.start_date)
            .with_visibility(draft.visibility)
            .with_active_days(draft.active_days.clone())
            .with_check_in_type(draft.check_in_type)
            .with_timezone_offset_minutes(draft.timezone_offset_minutes);
        if let Some(end) = draft.end_date {
            will = will.with_end_date(end);
        }
        if let Some(at) = draft.end_room_scheduled_at {
            will = will.with_end_room(at);
        }
        will
    }

    async fn get_will(&self, id: Uuid) -> DomainResult<Will> {
        self.wills
            .get(id)
            .await?
            .ok_or(DomainError::WillNotFound(id))
    }

    async fn get_member_will(&self, id: Uuid, actor: Uuid) -> DomainResult<Will> {
        let will = self.get_will(id).await?;
        if !will.is_member(actor) {
            return Err(DomainError::Authorization(format!(
                "user {actor} is not a member of will {id}"
            )));
        }
        Ok(will)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryCommitmentRepository, MemoryWillRepository};
    use crate::domain::ports::FixedClock;

    fn draft(start: NaiveDate, end: Option<NaiveDate>) -> WillDraft {
        WillDraft {
            title: "write every day".into(),
            visibility: Visibility::Private,
            start_date: start,
            end_date: end,
            active_days: ActiveDays::EveryDay,
            check_in_type: CheckInType::Daily,
            end_room_scheduled_at: None,
            timezone_offset_minutes: 0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service(now: &str) -> (WillService, Arc<MemoryWillRepository>) {
        let wills = Arc::new(MemoryWillRepository::default());
        let svc = WillService::new(
            wills.clone(),
            Arc::new(MemoryCommitmentRepository::default()),
            Arc::new(FixedClock::new(now.parse().unwrap())),
        );
        (svc, wills)
    }

    #[tokio::test]
    async fn test_solo_will_is_born_scheduled_or_active() {
        let (svc, _) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();

        let future = svc
            .create_solo(creator, draft(day(2026, 3, 10), None), "run", "health")
            .await
            .unwrap();
        assert_eq!(future.status, WillStatus::Scheduled);

        let started = svc
            .create_solo(creator, draft(day(2026, 3, 1), None), "run", "health")
            .await
            .unwrap();
        assert_eq!(started.status, WillStatus::Active);
    }

    #[tokio::test]
    async fn test_circle_will_starts_pending() {
        let (svc, _) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();
        let members = vec![creator, Uuid::new_v4(), Uuid::new_v4()];

        let will = svc
            .create_circle(creator, members, draft(day(2026, 3, 10), Some(day(2026, 3, 20))))
            .await
            .unwrap();
        assert_eq!(will.status, WillStatus::Pending);
    }

    #[tokio::test]
    async fn test_commitment_locked_after_activation() {
        let (svc, wills) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();
        let other = Uuid::new_v4();
        let will = svc
            .create_circle(creator, vec![creator, other], draft(day(2026, 3, 10), None))
            .await
            .unwrap();

        svc.submit_commitment(will.id, creator, "a", "b").await.unwrap();

        // force the will active, as the scheduler would
        let mut active = wills.get(will.id).await.unwrap().unwrap();
        active.status = WillStatus::Active;
        wills.insert(active);

        let err = svc.submit_commitment(will.id, other, "a", "b").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_commitment_owned_by_declaring_member() {
        let (svc, _) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();
        let other = Uuid::new_v4();
        let will = svc
            .create_circle(creator, vec![creator, other], draft(day(2026, 3, 10), None))
            .await
            .unwrap();
        svc.submit_commitment(will.id, creator, "a", "b").await.unwrap();

        let err = svc
            .update_commitment(will.id, creator, other, "hijacked", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_terminate_ends_indefinite_will() {
        let (svc, _) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();
        let will = svc
            .create_solo(creator, draft(day(2026, 3, 1), None), "run", "health")
            .await
            .unwrap();
        assert!(will.is_indefinite);

        let ended = svc.terminate(will.id, creator).await.unwrap();
        assert_eq!(ended.status, WillStatus::Terminated);
        assert!(ended.is_terminal());
    }

    #[tokio::test]
    async fn test_archive_is_creator_only() {
        let (svc, wills) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();
        let other = Uuid::new_v4();
        let will = svc
            .create_circle(creator, vec![creator, other], draft(day(2026, 3, 1), None))
            .await
            .unwrap();

        let mut completed = wills.get(will.id).await.unwrap().unwrap();
        completed.status = WillStatus::Completed;
        wills.insert(completed);

        let err = svc.archive(will.id, other).await.unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));

        let archived = svc.archive(will.id, creator).await.unwrap();
        assert_eq!(archived.status, WillStatus::Archived);
    }

    #[tokio::test]
    async fn test_update_will_is_creator_only() {
        let (svc, _) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();
        let other = Uuid::new_v4();
        let will = svc
            .create_circle(creator, vec![creator, other], draft(day(2026, 3, 10), None))
            .await
            .unwrap();

        let err = svc
            .update_will(will.id, other, Some("hijacked".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));

        let updated = svc
            .update_will(will.id, creator, Some("write nightly".into()), Some(Visibility::Public))
            .await
            .unwrap();
        assert_eq!(updated.title, "write nightly");
        assert_eq!(updated.visibility, Visibility::Public);
        assert_eq!(updated.version, will.version + 1);

        // empty titles never pass validation
        let err = svc
            .update_will(will.id, creator, Some("  ".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_rejected_after_start() {
        let (svc, _) = service("2026-03-05T12:00:00Z");
        let creator = Uuid::new_v4();
        let will = svc
            .create_solo(creator, draft(day(2026, 3, 1), None), "run", "health")
            .await
            .unwrap();
        // already active
        let err = svc.delete(will.id, creator).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
