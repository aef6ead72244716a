//! Service layer: orchestration over the domain ports.

pub mod checkin_service;
pub mod lifecycle;
pub mod progress;
pub mod review_gate;
pub mod will_service;

pub use checkin_service::CheckInService;
pub use lifecycle::{LifecycleScheduler, TickSummary};
pub use progress::{classify_follow_through, compute_progress, success_rate, WillProgress};
pub use review_gate::ReviewGate;
pub use will_service::{WillDraft, WillService};
