//! # minionhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON REST API** under `/api/minions` mapped 1:1 onto
//!   [`MinionService`](minionhub_app::services::minion_service::MinionService)
//! - Stream the minion feed as **server-sent events** at `/api/feed/minions`
//! - Map domain errors into HTTP responses carrying the stable error code
//!
//! ## Dependency rule
//! Depends on `minionhub-app` (for port traits and services) and `minionhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
