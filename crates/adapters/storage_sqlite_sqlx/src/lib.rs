//! # minionhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement [`MinionRepository`](minionhub_app::ports::MinionRepository)
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `minionhub-app` (for port traits) and `minionhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod minion_repo;
pub mod pool;

pub use minion_repo::SqliteMinionRepository;
pub use pool::{Config, Database};
