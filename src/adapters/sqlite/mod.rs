//! SQLite adapters: connection pooling, embedded migrations, and
//! repository implementations over the domain ports.

pub mod checkin_repository;
pub mod commitment_repository;
pub mod connection;
pub mod migrations;
pub mod review_repository;
pub mod will_repository;

pub use checkin_repository::SqliteCheckInRepository;
pub use commitment_repository::SqliteCommitmentRepository;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use review_repository::{SqliteAcknowledgmentRepository, SqliteReviewRepository};
pub use will_repository::SqliteWillRepository;
