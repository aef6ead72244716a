//! End-to-end lifecycle test over the SQLite adapters: a circle Will
//! driven from creation through completion and acknowledgment by a
//! fake clock and repeated scheduler ticks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use willcircle::adapters::sqlite::{
    all_embedded_migrations, create_test_pool, Migrator, SqliteAcknowledgmentRepository,
    SqliteCheckInRepository, SqliteCommitmentRepository, SqliteReviewRepository,
    SqliteWillRepository,
};
use willcircle::domain::models::{
    ActiveDays, CheckInStatus, FollowThrough, Visibility, Will, WillStatus,
};
use willcircle::domain::ports::{FixedClock, NullNotifier, WillRepository};
use willcircle::services::{
    CheckInService, LifecycleScheduler, ReviewGate, WillDraft, WillService,
};

struct Stack {
    wills: Arc<SqliteWillRepository>,
    will_service: WillService,
    check_ins: CheckInService,
    gate: ReviewGate,
    scheduler: LifecycleScheduler,
    clock: Arc<FixedClock>,
}

async fn stack(now: &str) -> Stack {
    let pool = create_test_pool().await.expect("in-memory pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("migrations");

    let wills = Arc::new(SqliteWillRepository::new(pool.clone()));
    let check_in_repo = Arc::new(SqliteCheckInRepository::new(pool.clone()));
    let commitments = Arc::new(SqliteCommitmentRepository::new(pool.clone()));
    let reviews = Arc::new(SqliteReviewRepository::new(pool.clone()));
    let acknowledgments = Arc::new(SqliteAcknowledgmentRepository::new(pool));
    let clock = Arc::new(FixedClock::new(now.parse().unwrap()));

    Stack {
        wills: wills.clone(),
        will_service: WillService::new(wills.clone(), commitments.clone(), clock.clone()),
        check_ins: CheckInService::new(wills.clone(), check_in_repo.clone(), clock.clone()),
        gate: ReviewGate::new(
            wills.clone(),
            commitments.clone(),
            reviews.clone(),
            acknowledgments,
        ),
        scheduler: LifecycleScheduler::new(
            wills,
            commitments,
            check_in_repo,
            reviews,
            Arc::new(NullNotifier),
            clock.clone(),
            Duration::from_secs(60),
        ),
        clock,
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

async fn status_of(stack: &Stack, id: Uuid) -> WillStatus {
    stack.wills.get(id).await.unwrap().unwrap().status
}

#[tokio::test]
async fn test_circle_will_full_lifecycle() {
    let s = stack("2026-02-20T12:00:00Z").await;
    let creator = Uuid::new_v4();
    let friend = Uuid::new_v4();

    let will = s
        .will_service
        .create_circle(
            creator,
            vec![creator, friend],
            WillDraft {
                title: "morning pages".into(),
                visibility: Visibility::Private,
                start_date: day(2026, 3, 1),
                end_date: Some(day(2026, 3, 5)),
                active_days: ActiveDays::EveryDay,
                check_in_type: willcircle::domain::models::CheckInType::Daily,
                end_room_scheduled_at: None,
                timezone_offset_minutes: 0,
            },
        )
        .await
        .unwrap();
    assert_eq!(will.status, WillStatus::Pending);

    // pending until both commitments are in
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::Pending);

    s.will_service
        .submit_commitment(will.id, creator, "write three pages", "clarity")
        .await
        .unwrap();
    s.will_service
        .submit_commitment(will.id, friend, "write one page", "habit")
        .await
        .unwrap();
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::Scheduled);

    // activation on the start date
    s.clock.set(at("2026-03-01T07:00:00Z"));
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::Active);

    // check-ins land while active
    for d in 1..=5u32 {
        s.clock.set(at(&format!("2026-03-0{d}T20:00:00Z")));
        let status = if d == 3 { CheckInStatus::Partial } else { CheckInStatus::Yes };
        s.check_ins
            .record_check_in(will.id, creator, day(2026, 3, d), status)
            .await
            .unwrap();
    }

    let progress = s.check_ins.progress(will.id).await.unwrap();
    assert_eq!(progress.total_days, 5);
    assert_eq!(progress.checked_in_days, 5);
    // round(100 * (4 + 0.5) / 5) = 90
    assert_eq!(progress.success_rate, 90);
    assert_eq!(progress.current_streak, 5);

    // the end date itself stays active; review opens the day after
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::Active);

    s.clock.set(at("2026-03-06T06:00:00Z"));
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::WillReview);

    // check-ins are rejected once review opens
    assert!(s
        .check_ins
        .record_check_in(will.id, creator, day(2026, 3, 5), CheckInStatus::Yes)
        .await
        .is_err());

    // completion requires every committed member's review
    s.gate
        .submit_review(will.id, creator, FollowThrough::Yes, None)
        .await
        .unwrap();
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::WillReview);

    s.gate
        .submit_review(will.id, friend, FollowThrough::Mostly, Some("missed a day".into()))
        .await
        .unwrap();
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::Completed);

    // acknowledgments release members individually
    s.gate.acknowledge(will.id, creator).await.unwrap();
    assert!(!s.gate.ready_for_new_will(will.id).await.unwrap());
    assert_eq!(
        s.gate.display_status_for(will.id, creator).await.unwrap(),
        WillStatus::Archived
    );
    assert_eq!(
        s.gate.display_status_for(will.id, friend).await.unwrap(),
        WillStatus::Completed
    );

    s.gate.acknowledge(will.id, friend).await.unwrap();
    assert!(s.gate.ready_for_new_will(will.id).await.unwrap());

    // persisted status stays completed until the creator archives
    assert_eq!(status_of(&s, will.id).await, WillStatus::Completed);
    let archived = s.will_service.archive(will.id, creator).await.unwrap();
    assert_eq!(archived.status, WillStatus::Archived);
}

#[tokio::test]
async fn test_pause_shields_a_will_from_the_scheduler() {
    let s = stack("2026-03-02T12:00:00Z").await;
    let creator = Uuid::new_v4();

    let will = s
        .will_service
        .create_solo(
            creator,
            WillDraft {
                title: "stretch".into(),
                visibility: Visibility::Private,
                start_date: day(2026, 3, 1),
                end_date: Some(day(2026, 3, 3)),
                active_days: ActiveDays::EveryDay,
                check_in_type: willcircle::domain::models::CheckInType::Daily,
                end_room_scheduled_at: None,
                timezone_offset_minutes: 0,
            },
            "stretch for ten minutes",
            "back pain",
        )
        .await
        .unwrap();
    assert_eq!(will.status, WillStatus::Active);

    s.will_service.pause(will.id, creator).await.unwrap();

    // well past the end date, but paused wills are never advanced
    s.clock.set(at("2026-04-01T12:00:00Z"));
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::Paused);

    let resumed = s.will_service.resume(will.id, creator).await.unwrap();
    assert_eq!(resumed.status, WillStatus::Active);

    // the next tick picks up where time left off
    s.scheduler.tick().await;
    assert_eq!(status_of(&s, will.id).await, WillStatus::WillReview);
}
