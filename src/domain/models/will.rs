//! Will domain model.
//!
//! A Will is a time-boxed commitment held by one member (solo) or a
//! small circle. Its lifecycle is a one-directional chain advanced by
//! the scheduler; the persisted status is the single source of truth
//! and clients never re-derive it.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::end_room::EndRoomStatus;
use crate::domain::errors::DomainError;

/// Status of a Will along its lifecycle chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WillStatus {
    /// Circle Will awaiting commitments from every member.
    Pending,
    /// All commitments in; start date not yet reached.
    Scheduled,
    /// Commitment period in progress; check-ins accepted.
    Active,
    /// Period over; members submit their reviews.
    WillReview,
    /// Every committed member has reviewed; acknowledgments pending.
    Completed,
    /// Administratively suspended; resumes to the prior status.
    Paused,
    /// Ended by explicit member action (the only exit for indefinite Wills).
    Terminated,
    /// Terminal administrative state.
    Archived,
}

impl Default for WillStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Compatibility table for status strings written by earlier releases.
/// Kept explicit so legacy remaps live in exactly one place.
const LEGACY_STATUS_REMAP: &[(&str, WillStatus)] = &[
    ("in_progress", WillStatus::Active),
    ("ongoing", WillStatus::Active),
    ("review", WillStatus::WillReview),
    ("reviewing", WillStatus::WillReview),
    ("done", WillStatus::Completed),
    ("complete", WillStatus::Completed),
    ("cancelled", WillStatus::Terminated),
    ("canceled", WillStatus::Terminated),
];

impl WillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::WillReview => "will_review",
            Self::Completed => "completed",
            Self::Paused => "paused",
            Self::Terminated => "terminated",
            Self::Archived => "archived",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        match s.as_str() {
            "pending" => Some(Self::Pending),
            "scheduled" => Some(Self::Scheduled),
            "active" => Some(Self::Active),
            "will_review" => Some(Self::WillReview),
            "completed" => Some(Self::Completed),
            "paused" => Some(Self::Paused),
            "terminated" => Some(Self::Terminated),
            "archived" => Some(Self::Archived),
            other => LEGACY_STATUS_REMAP
                .iter()
                .find(|(legacy, _)| *legacy == other)
                .map(|(_, status)| *status),
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Archived)
    }

    /// The next status on the forward chain, if the chain continues.
    /// Administrative states (`Paused`, terminal states) have no
    /// forward successor; `Completed -> Archived` is administrative
    /// and deliberately excluded so the scheduler never auto-archives.
    pub fn next_forward(&self) -> Option<WillStatus> {
        match self {
            Self::Pending => Some(Self::Scheduled),
            Self::Scheduled => Some(Self::Active),
            Self::Active => Some(Self::WillReview),
            Self::WillReview => Some(Self::Completed),
            _ => None,
        }
    }

    /// Valid transitions from this status. Forward moves never skip a
    /// step; pause/terminate are available from every pre-completion
    /// state; `Paused` may resume to any pre-completion state (the Will
    /// itself restricts resume to the recorded prior status).
    pub fn valid_transitions(&self) -> Vec<WillStatus> {
        match self {
            Self::Pending => vec![Self::Scheduled, Self::Paused, Self::Terminated],
            Self::Scheduled => vec![Self::Active, Self::Paused, Self::Terminated],
            Self::Active => vec![Self::WillReview, Self::Paused, Self::Terminated],
            Self::WillReview => vec![Self::Completed, Self::Paused, Self::Terminated],
            Self::Completed => vec![Self::Archived],
            Self::Paused => vec![
                Self::Pending,
                Self::Scheduled,
                Self::Active,
                Self::WillReview,
                Self::Terminated,
            ],
            Self::Terminated | Self::Archived => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Map a persisted status plus the viewing member's acknowledgment flag
/// to the status that member should see. A completed Will stays visible
/// as `completed` until the viewer's own acknowledgment is recorded,
/// regardless of what other members have done; after that it reads as
/// `archived` and the member is released to start a new Will.
pub fn display_status(persisted: WillStatus, viewer_acknowledged: bool) -> WillStatus {
    match persisted {
        WillStatus::Completed if viewer_acknowledged => WillStatus::Archived,
        other => other,
    }
}

/// Solo or circle ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WillMode {
    Solo,
    Circle,
}

impl WillMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Circle => "circle",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "solo" => Some(Self::Solo),
            "circle" => Some(Self::Circle),
            _ => None,
        }
    }
}

/// Who can see the Will.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "private" => Some(Self::Private),
            "public" => Some(Self::Public),
            _ => None,
        }
    }
}

/// Cadence of adherence reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInType {
    Daily,
    OneTime,
}

impl CheckInType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::OneTime => "one_time",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "one_time" | "one-time" => Some(Self::OneTime),
            _ => None,
        }
    }
}

/// Which calendar days the Will expects adherence on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveDays {
    EveryDay,
    Weekdays,
    Custom { days: Vec<Weekday> },
}

impl Default for ActiveDays {
    fn default() -> Self {
        Self::EveryDay
    }
}

impl ActiveDays {
    pub fn is_active_on(&self, day: Weekday) -> bool {
        match self {
            Self::EveryDay => true,
            Self::Weekdays => !matches!(day, Weekday::Sat | Weekday::Sun),
            Self::Custom { days } => days.contains(&day),
        }
    }
}

/// A declared, time-boxed commitment, solo or shared within a circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Will {
    pub id: Uuid,
    pub title: String,
    pub mode: WillMode,
    pub visibility: Visibility,
    pub status: WillStatus,
    /// Status to restore on resume; set only while `Paused`.
    pub paused_from: Option<WillStatus>,
    pub start_date: NaiveDate,
    /// None iff `is_indefinite`.
    pub end_date: Option<NaiveDate>,
    pub is_indefinite: bool,
    pub active_days: ActiveDays,
    pub check_in_type: CheckInType,
    /// Optional synchronous reflection session tied to the conclusion.
    pub end_room_scheduled_at: Option<DateTime<Utc>>,
    /// Cache of the pure window function, refreshed by the scheduler.
    pub end_room_status: Option<EndRoomStatus>,
    /// Members expected to commit (creator included).
    pub member_ids: Vec<Uuid>,
    pub created_by: Uuid,
    /// Canonical zone for date keys: the creator's UTC offset captured
    /// at creation, so the (will, date) join key is stable across
    /// member devices in different zones.
    pub timezone_offset_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Version for optimistic locking.
    pub version: u64,
}

/// Circle size bounds (creator included).
pub const MIN_CIRCLE_MEMBERS: usize = 2;
pub const MAX_CIRCLE_MEMBERS: usize = 4;

impl Will {
    pub fn new(
        title: impl Into<String>,
        created_by: Uuid,
        mode: WillMode,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            mode,
            visibility: Visibility::Private,
            status: WillStatus::Pending,
            paused_from: None,
            start_date,
            end_date: None,
            is_indefinite: true,
            active_days: ActiveDays::default(),
            check_in_type: CheckInType::Daily,
            end_room_scheduled_at: None,
            end_room_status: None,
            member_ids: vec![created_by],
            created_by,
            timezone_offset_minutes: 0,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Set a fixed end date, making the Will definite.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self.is_indefinite = false;
        self
    }

    pub fn with_members(mut self, member_ids: Vec<Uuid>) -> Self {
        self.member_ids = member_ids;
        self
    }

    pub fn with_active_days(mut self, active_days: ActiveDays) -> Self {
        self.active_days = active_days;
        self
    }

    pub fn with_check_in_type(mut self, check_in_type: CheckInType) -> Self {
        self.check_in_type = check_in_type;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_end_room(mut self, scheduled_at: DateTime<Utc>) -> Self {
        self.end_room_scheduled_at = Some(scheduled_at);
        self.end_room_status = Some(EndRoomStatus::Pending);
        self
    }

    pub fn with_timezone_offset_minutes(mut self, offset: i32) -> Self {
        self.timezone_offset_minutes = offset;
        self
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Commitments are editable only before the Will starts moving.
    pub fn commitments_mutable(&self) -> bool {
        matches!(self.status, WillStatus::Pending | WillStatus::Scheduled)
    }

    /// Today's calendar date in the Will's canonical zone.
    pub fn local_today(&self, now: DateTime<Utc>) -> NaiveDate {
        let offset = FixedOffset::east_opt(self.timezone_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        now.with_timezone(&offset).date_naive()
    }

    /// Inclusive date range check-ins are accepted for, given today.
    /// None when the Will has not started yet.
    pub fn check_in_range(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let upper = match self.end_date {
            Some(end) => end.min(today),
            None => today,
        };
        if upper < self.start_date {
            return None;
        }
        Some((self.start_date, upper))
    }

    /// Whether the given date falls on one of the Will's active days.
    pub fn is_active_day(&self, date: NaiveDate) -> bool {
        self.active_days.is_active_on(date.weekday())
    }

    pub fn can_transition_to(&self, new_status: WillStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to a new status, enforcing the chain.
    pub fn transition_to(
        &mut self,
        new_status: WillStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.can_transition_to(new_status) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "not a permitted lifecycle move".to_string(),
            });
        }
        self.status = new_status;
        self.updated_at = now;
        self.version += 1;
        Ok(())
    }

    /// Administrative pause. Records the prior status for resume.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        let prior = self.status;
        self.transition_to(WillStatus::Paused, now)?;
        self.paused_from = Some(prior);
        Ok(())
    }

    /// Resume to the status recorded at pause time.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        let target = self.paused_from.ok_or(DomainError::InvalidStateTransition {
            from: self.status.as_str().to_string(),
            to: "?".to_string(),
            reason: "no paused_from recorded".to_string(),
        })?;
        self.transition_to(target, now)?;
        self.paused_from = None;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("will title cannot be empty".into()));
        }
        if self.is_indefinite != self.end_date.is_none() {
            return Err(DomainError::Validation(
                "end_date must be unset exactly when the will is indefinite".into(),
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(DomainError::Validation(format!(
                    "end_date {} precedes start_date {}",
                    end, self.start_date
                )));
            }
        }
        if !self.member_ids.contains(&self.created_by) {
            return Err(DomainError::Validation(
                "creator must be among the members".into(),
            ));
        }
        match self.mode {
            WillMode::Solo => {
                if self.member_ids.len() != 1 {
                    return Err(DomainError::Validation(
                        "solo will must have exactly one member".into(),
                    ));
                }
            }
            WillMode::Circle => {
                let n = self.member_ids.len();
                if !(MIN_CIRCLE_MEMBERS..=MAX_CIRCLE_MEMBERS).contains(&n) {
                    return Err(DomainError::Validation(format!(
                        "circle will must have {MIN_CIRCLE_MEMBERS}-{MAX_CIRCLE_MEMBERS} members, got {n}"
                    )));
                }
            }
        }
        if let ActiveDays::Custom { days } = &self.active_days {
            if days.is_empty() {
                return Err(DomainError::Validation(
                    "custom active days cannot be empty".into(),
                ));
            }
        }
        Ok(())
    }
}
