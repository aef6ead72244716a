//! Check-in recording and progress queries.
//!
//! Member API calls are the only writers of check-in rows; the
//! scheduler never touches them. Validation happens here so the
//! repository can stay a dumb upsert.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{date_key, CheckIn, CheckInStatus, FollowThrough, Will, WillStatus};
use crate::domain::ports::{CheckInRepository, Clock, WillRepository};
use crate::services::progress::{classify_follow_through, compute_progress, WillProgress};

pub struct CheckInService {
    wills: Arc<dyn WillRepository>,
    check_ins: Arc<dyn CheckInRepository>,
    clock: Arc<dyn Clock>,
}

impl CheckInService {
    pub fn new(
        wills: Arc<dyn WillRepository>,
        check_ins: Arc<dyn CheckInRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { wills, check_ins, clock }
    }

    /// Upsert the adherence report for (will, date).
    ///
    /// Rejects dates outside `[start_date, min(end_date, today)]`:
    /// the future and the pre-start period are never reportable, and a
    /// finished Will accepts nothing past its end date.
    pub async fn record_check_in(
        &self,
        will_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        status: CheckInStatus,
    ) -> DomainResult<CheckIn> {
        let will = self.get_will(will_id).await?;

        if !will.is_member(user_id) {
            return Err(DomainError::Authorization(format!(
                "user {user_id} is not a member of will {will_id}"
            )));
        }
        if will.status != WillStatus::Active {
            return Err(DomainError::Validation(format!(
                "check-ins are only accepted while the will is active (status is {})",
                will.status.as_str()
            )));
        }

        let today = will.local_today(self.clock.now());
        let Some((lower, upper)) = will.check_in_range(today) else {
            return Err(DomainError::Validation(format!(
                "will has not started yet; first reportable day is {}",
                date_key(will.start_date)
            )));
        };
        if date < lower || date > upper {
            return Err(DomainError::Validation(format!(
                "date {} is outside the reportable range {}..={}",
                date_key(date),
                date_key(lower),
                date_key(upper)
            )));
        }
        // Active days constrain which dates are reportable; the period
        // itself still runs to the end date.
        if !will.is_active_day(date) {
            return Err(DomainError::Validation(format!(
                "{} falls outside the will's active days",
                date_key(date)
            )));
        }

        self.check_ins
            .upsert(&CheckIn::new(will_id, user_id, date, status))
            .await
    }

    /// Aggregate statistics for a Will's check-in history.
    pub async fn progress(&self, will_id: Uuid) -> DomainResult<WillProgress> {
        let will = self.get_will(will_id).await?;
        let check_ins = self.check_ins.list_for_will(will_id).await?;
        let today = will.local_today(self.clock.now());
        Ok(compute_progress(&will, &check_ins, today))
    }

    /// Suggested follow-through rating to prefill a member's review.
    pub async fn suggested_follow_through(&self, will_id: Uuid) -> DomainResult<FollowThrough> {
        let progress = self.progress(will_id).await?;
        Ok(classify_follow_through(progress.success_rate))
    }

    async fn get_will(&self, id: Uuid) -> DomainResult<Will> {
        self.wills
            .get(id)
            .await?
            .ok_or(DomainError::WillNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryCheckInRepository, MemoryWillRepository};
    use crate::domain::models::{ActiveDays, Will, WillMode};
    use crate::domain::ports::FixedClock;
    use chrono::{DateTime, Utc};

    fn noon(date: &str) -> DateTime<Utc> {
        format!("{date}T12:00:00Z").parse().unwrap()
    }

    fn day(ymd: (i32, u32, u32)) -> NaiveDate {
        NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap()
    }

    async fn service_with_active_will() -> (CheckInService, Will, Uuid) {
        let creator = Uuid::new_v4();
        let mut will = Will::new("stretch daily", creator, WillMode::Solo, day((2026, 3, 1)))
            .with_end_date(day((2026, 3, 10)));
        will.status = WillStatus::Active;

        let wills = Arc::new(MemoryWillRepository::default());
        wills.insert(will.clone());
        let check_ins = Arc::new(MemoryCheckInRepository::default());
        let clock = Arc::new(FixedClock::new(noon("2026-03-05")));

        let service = CheckInService::new(wills, check_ins, clock);
        (service, will, creator)
    }

    #[tokio::test]
    async fn test_resubmission_overwrites() {
        let (service, will, creator) = service_with_active_will().await;
        let date = day((2026, 3, 3));

        service
            .record_check_in(will.id, creator, date, CheckInStatus::No)
            .await
            .unwrap();
        let second = service
            .record_check_in(will.id, creator, date, CheckInStatus::Yes)
            .await
            .unwrap();

        assert_eq!(second.status, CheckInStatus::Yes);
        let progress = service.progress(will.id).await.unwrap();
        assert_eq!(progress.checked_in_days, 1, "upsert must not duplicate");
        assert_eq!(progress.yes_count, 1);
        assert_eq!(progress.no_count, 0);
    }

    #[tokio::test]
    async fn test_future_date_rejected() {
        let (service, will, creator) = service_with_active_will().await;
        // today is 2026-03-05
        let err = service
            .record_check_in(will.id, creator, day((2026, 3, 6)), CheckInStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_date_after_end_rejected() {
        let (service, will, creator) = service_with_active_will().await;
        // move past the end of the will; end_date caps the range
        let err = service
            .record_check_in(will.id, creator, day((2026, 3, 11)), CheckInStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_date_before_start_rejected() {
        let (service, will, creator) = service_with_active_will().await;
        let err = service
            .record_check_in(will.id, creator, day((2026, 2, 27)), CheckInStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_off_schedule_day_rejected() {
        let creator = Uuid::new_v4();
        let mut will = Will::new("gym before work", creator, WillMode::Solo, day((2026, 3, 1)))
            .with_end_date(day((2026, 3, 10)))
            .with_active_days(ActiveDays::Weekdays);
        will.status = WillStatus::Active;

        let wills = Arc::new(MemoryWillRepository::default());
        wills.insert(will.clone());
        let service = CheckInService::new(
            wills,
            Arc::new(MemoryCheckInRepository::default()),
            Arc::new(FixedClock::new(noon("2026-03-09"))),
        );

        // 2026-03-07 is a Saturday: in range, but off schedule
        let err = service
            .record_check_in(will.id, creator, day((2026, 3, 7)), CheckInStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // the Friday before is on schedule
        service
            .record_check_in(will.id, creator, day((2026, 3, 6)), CheckInStatus::Yes)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_member_rejected() {
        let (service, will, _creator) = service_with_active_will().await;
        let stranger = Uuid::new_v4();
        let err = service
            .record_check_in(will.id, stranger, day((2026, 3, 3)), CheckInStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_inactive_will_rejected() {
        let (service, will, creator) = service_with_active_will().await;
        // a second will that never went active
        let mut scheduled = Will::new("later", creator, WillMode::Solo, day((2026, 3, 1)));
        scheduled.status = WillStatus::Scheduled;
        let wills = Arc::new(MemoryWillRepository::default());
        wills.insert(scheduled.clone());
        let service2 = CheckInService::new(
            wills,
            Arc::new(MemoryCheckInRepository::default()),
            Arc::new(FixedClock::new(noon("2026-03-05"))),
        );

        let err = service2
            .record_check_in(scheduled.id, creator, day((2026, 3, 2)), CheckInStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        // and the active one still works
        service
            .record_check_in(will.id, creator, day((2026, 3, 2)), CheckInStatus::Yes)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_will() {
        let (service, _will, creator) = service_with_active_will().await;
        let err = service
            .record_check_in(Uuid::new_v4(), creator, day((2026, 3, 2)), CheckInStatus::Yes)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::WillNotFound(_)));
    }
}
