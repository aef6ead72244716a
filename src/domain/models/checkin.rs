//! Check-in domain model.
//!
//! A check-in is a per-day self-report of adherence against an active
//! Will. Keyed by (will_id, calendar date); resubmission for the same
//! date overwrites rather than appending.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reported adherence for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Yes,
    No,
    Partial,
}

impl CheckInStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Partial => "partial",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "partial" => Some(Self::Partial),
            _ => None,
        }
    }

    /// Yes and partial extend a streak; an explicit no resets it.
    pub fn counts_toward_streak(&self) -> bool {
        matches!(self, Self::Yes | Self::Partial)
    }
}

/// One adherence record for (will, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub will_id: Uuid,
    /// Member who submitted the most recent report for this date.
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub status: CheckInStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckIn {
    pub fn new(will_id: Uuid, user_id: Uuid, date: NaiveDate, status: CheckInStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            will_id,
            user_id,
            date,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    /// The zero-padded `YYYY-MM-DD` join key used everywhere a check-in
    /// meets the calendar.
    pub fn date_key(&self) -> String {
        date_key(self.date)
    }
}

/// Canonical date key format: local calendar date, zero-padded, no time
/// component.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` key back into a date.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(date_key(date), "2026-03-05");
    }

    #[test]
    fn test_date_key_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(parse_date_key(&date_key(date)), Some(date));
        assert_eq!(parse_date_key("not-a-date"), None);
        assert_eq!(parse_date_key("2026-13-40"), None);
    }

    #[test]
    fn test_streak_contribution() {
        assert!(CheckInStatus::Yes.counts_toward_streak());
        assert!(CheckInStatus::Partial.counts_toward_streak());
        assert!(!CheckInStatus::No.counts_toward_streak());
    }
}
