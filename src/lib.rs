//! willcircle - Commitment Accountability Engine
//!
//! willcircle tracks time-boxed commitments ("Wills") held solo or in
//! small circles: per-day check-ins, progress aggregation, end-of-term
//! reviews, and a scheduler that advances each Will along its lifecycle.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, error taxonomy, and ports
//! - **Service Layer** (`services`): Business logic over the ports
//! - **Adapters** (`adapters`): SQLite and in-memory port implementations,
//!   plus the member-facing HTTP API
//! - **Infrastructure** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    CheckIn, CheckInStatus, Commitment, Config, FollowThrough, Review, Will, WillMode, WillStatus,
};
pub use domain::ports::{
    CheckInRepository, Clock, CommitmentRepository, ReviewRepository, WillRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CheckInService, LifecycleScheduler, ReviewGate, WillService};
