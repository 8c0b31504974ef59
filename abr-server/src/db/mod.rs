//! Database layer - SQLite pool and repositories
//!
//! - One pool per process, WAL journal
//! - Schema applied at startup (idempotent `CREATE ... IF NOT EXISTS`)
//! - Upserts handle conflicts in SQL; no check-then-insert

pub mod pool;
pub mod repos;

pub use pool::{apply_schema, create_pool, open_in_memory};
pub use repos::*;
