//! abr-server: tab-order preference service
//!
//! Persists each user's tab order per dashboard page in SQLite and serves
//! it over a small JSON API consumed by the dashboard's HTTP backend.

pub mod db;
pub mod http;
pub mod models;
pub mod tracing_setup;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
