//! Logging setup.

pub mod logger;

pub use logger::Logger;
