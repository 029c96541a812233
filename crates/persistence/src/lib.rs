//! Persistence layer for the ODCSE backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - SQL migrations (embedded via `sqlx::migrate!` in the API crate)

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
