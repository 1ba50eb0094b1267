//! HTTP API: configuration, routing, and request/response mapping for the
//! asset lifecycle log.

pub mod app;
pub mod config;

pub use config::ApiConfig;
