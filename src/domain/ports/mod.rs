//! Ports: traits the domain consumes, implemented by adapters.

pub mod checkin_repository;
pub mod clock;
pub mod commitment_repository;
pub mod notifier;
pub mod review_repository;
pub mod will_repository;

pub use checkin_repository::CheckInRepository;
pub use clock::{Clock, FixedClock, SystemClock};
pub use commitment_repository::CommitmentRepository;
pub use notifier::{LoggingNotifier, NullNotifier, TransitionNotice, TransitionNotifier};
pub use review_repository::{AcknowledgmentRepository, ReviewRepository};
pub use will_repository::{WillFilter, WillRepository};
