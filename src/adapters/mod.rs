//! Adapters: implementations of the domain ports against real
//! backends, plus the member-facing HTTP surface.

pub mod http;
pub mod memory;
pub mod sqlite;
