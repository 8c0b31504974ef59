//! Repository implementations for database access

pub mod tab_orders;

pub use tab_orders::{DbError, TabOrderRepo};
