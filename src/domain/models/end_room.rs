//! End Room window derivation.
//!
//! The End Room is an optional synchronous 30-minute reflection session
//! tied to a Will's conclusion. Its open/closed state is a pure function
//! of the scheduled instant and the current instant; the status column
//! on the Will row is only a cache the scheduler keeps in agreement.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long the room stays open once the scheduled instant arrives.
pub const END_ROOM_WINDOW_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndRoomStatus {
    /// Before the scheduled instant.
    Pending,
    /// Within `[scheduled_at, scheduled_at + 30m)`.
    Open,
    /// At or after the close of the window.
    Completed,
}

impl EndRoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Completed => "completed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "open" => Some(Self::Open),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Authoritative window state for a scheduled End Room.
pub fn window_status(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> EndRoomStatus {
    let closes_at = scheduled_at + Duration::minutes(END_ROOM_WINDOW_MINUTES);
    if now < scheduled_at {
        EndRoomStatus::Pending
    } else if now < closes_at {
        EndRoomStatus::Open
    } else {
        EndRoomStatus::Completed
    }
}
