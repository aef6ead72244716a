//! HTTP adapter.

pub mod wills_http;

pub use wills_http::WillsHttpServer;
