//! Time-driven lifecycle advancement.
//!
//! A periodic tick evaluates every non-terminal Will and advances it
//! at most one step along the forward chain. All scheduler status
//! writes go through `compare_and_set_status`, so overlapping ticks
//! (or a second process) degrade to no-ops rather than double-applying
//! a transition. One Will failing never stops the sweep.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{window_status, CheckInType, Will, WillStatus};
use crate::domain::ports::{
    CheckInRepository, Clock, CommitmentRepository, ReviewRepository, TransitionNotice,
    TransitionNotifier, WillRepository,
};
use crate::services::review_gate::all_reviews_submitted;

/// Outcome of one sweep over the non-terminal Wills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub evaluated: usize,
    pub transitioned: usize,
    pub errors: usize,
}

pub struct LifecycleScheduler {
    wills: Arc<dyn WillRepository>,
    commitments: Arc<dyn CommitmentRepository>,
    check_ins: Arc<dyn CheckInRepository>,
    reviews: Arc<dyn ReviewRepository>,
    notifier: Arc<dyn TransitionNotifier>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    running: AtomicBool,
}

impl LifecycleScheduler {
    pub fn new(
        wills: Arc<dyn WillRepository>,
        commitments: Arc<dyn CommitmentRepository>,
        check_ins: Arc<dyn CheckInRepository>,
        reviews: Arc<dyn ReviewRepository>,
        notifier: Arc<dyn TransitionNotifier>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            wills,
            commitments,
            check_ins,
            reviews,
            notifier,
            clock,
            tick_interval,
            running: AtomicBool::new(false),
        }
    }

    /// Spawn the periodic tick loop. Call `stop` to end it; the loop
    /// exits at the next interval boundary.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let scheduler = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            tracing::info!(
                interval_secs = scheduler.tick_interval.as_secs(),
                "lifecycle scheduler started"
            );
            while scheduler.running.load(Ordering::SeqCst) {
                interval.tick().await;
                if !scheduler.running.load(Ordering::SeqCst) {
                    break;
                }
                let summary = scheduler.tick().await;
                if summary.transitioned > 0 || summary.errors > 0 {
                    tracing::info!(
                        evaluated = summary.evaluated,
                        transitioned = summary.transitioned,
                        errors = summary.errors,
                        "lifecycle tick"
                    );
                }
            }
            tracing::info!("lifecycle scheduler stopped");
        })
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// One sweep: evaluate every non-terminal Will independently.
    /// Idempotent; a tick that finds nothing to do changes nothing.
    pub async fn tick(&self) -> TickSummary {
        let wills = match self.wills.list_non_terminal().await {
            Ok(wills) => wills,
            Err(error) => {
                tracing::warn!(%error, "lifecycle tick could not list wills");
                return TickSummary { evaluated: 0, transitioned: 0, errors: 1 };
            }
        };

        let mut summary = TickSummary { evaluated: wills.len(), ..TickSummary::default() };
        for will in &wills {
            match self.evaluate(will).await {
                Ok(true) => summary.transitioned += 1,
                Ok(false) => {}
                Err(error) => {
                    summary.errors += 1;
                    tracing::warn!(will_id = %will.id, %error, "lifecycle evaluation failed");
                }
            }
        }
        summary
    }

    /// Evaluate one Will: refresh the End Room cache, then apply at
    /// most one forward transition. Returns whether a status moved.
    async fn evaluate(&self, will: &Will) -> DomainResult<bool> {
        self.refresh_end_room(will).await?;

        let Some(next) = self.desired_transition(will).await? else {
            return Ok(false);
        };

        // Lost race (another tick or an admin action moved the row
        // first) comes back false; the next tick re-evaluates.
        let moved = self
            .wills
            .compare_and_set_status(will.id, will.status, next)
            .await?;
        if moved {
            self.notifier
                .notify(TransitionNotice {
                    will_id: will.id,
                    old_status: will.status,
                    new_status: next,
                    occurred_at: self.clock.now(),
                })
                .await;
        }
        Ok(moved)
    }

    /// The single forward step this Will is due for, if any.
    async fn desired_transition(&self, will: &Will) -> DomainResult<Option<WillStatus>> {
        let now = self.clock.now();
        let today = will.local_today(now);

        let due = match will.status {
            WillStatus::Pending => self.all_members_committed(will).await?,
            WillStatus::Scheduled => today >= will.start_date,
            WillStatus::Active => match will.check_in_type {
                // one-time wills conclude once the single report lands
                CheckInType::OneTime => self.check_ins.count_for_will(will.id).await? > 0,
                // the end date itself stays reportable; review starts
                // the day after
                CheckInType::Daily => {
                    will.end_date.is_some_and(|end| today > end)
                }
            },
            WillStatus::WillReview => {
                all_reviews_submitted(self.commitments.as_ref(), self.reviews.as_ref(), will.id)
                    .await?
            }
            // completed -> archived is administrative; paused and
            // terminal states are never advanced by the scheduler
            _ => false,
        };

        Ok(if due { will.status.next_forward() } else { None })
    }

    async fn all_members_committed(&self, will: &Will) -> DomainResult<bool> {
        let committed: HashSet<Uuid> = self
            .commitments
            .list_for_will(will.id)
            .await?
            .into_iter()
            .map(|c| c.user_id)
            .collect();
        Ok(will.member_ids.iter().all(|m| committed.contains(m)))
    }

    /// Keep the cached End Room status in agreement with the pure
    /// window function. The cache only moves forward.
    async fn refresh_end_room(&self, will: &Will) -> DomainResult<()> {
        let Some(scheduled_at) = will.end_room_scheduled_at else {
            return Ok(());
        };
        let current = window_status(scheduled_at, self.clock.now());
        if will.end_room_status != Some(current) {
            self.wills.set_end_room_status(will.id, current).await?;
        }
        Ok(())
    }
}
