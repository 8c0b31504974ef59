//! Terminal dashboard over the ABR record pages.
//!
//! Each page shows status tabs (reorderable by drag or keyboard, persisted
//! per user) above a paginated table.

pub mod api;
pub mod app;
pub mod data;
pub mod event;
pub mod page;
pub mod terminal;
pub mod tracing_setup;
pub mod ui;

pub use api::HttpTabOrderBackend;
pub use app::{App, AppEvent, AppOptions};
