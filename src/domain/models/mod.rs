//! Domain models: pure data with validation, no I/O.

pub mod checkin;
pub mod commitment;
pub mod config;
pub mod end_room;
pub mod review;
pub mod will;

pub use checkin::{date_key, parse_date_key, CheckIn, CheckInStatus};
pub use commitment::{Commitment, MAX_COMMITMENT_TEXT_LEN};
pub use config::{Config, DatabaseConfig, HttpConfig, LoggingConfig, SchedulerConfig};
pub use end_room::{window_status, EndRoomStatus, END_ROOM_WINDOW_MINUTES};
pub use review::{Acknowledgment, FollowThrough, Review, MAX_REFLECTION_LEN};
pub use will::{
    display_status, ActiveDays, CheckInType, Visibility, Will, WillMode, WillStatus,
    MAX_CIRCLE_MEMBERS, MIN_CIRCLE_MEMBERS,
};
