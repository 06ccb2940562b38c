//! # minionhub-domain
//!
//! Pure domain model for the minionhub device-synchronization core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, stable error codes
//! - Define **Minions** (logical controllable devices bound to a physical mac)
//! - Define **Minion statuses** as a tagged union keyed by minion type
//! - Define **Device kinds** (static `(brand, model)` capability descriptors)
//! - Define **Local network devices** (discovery results)
//! - Define **Feed events** (`created` / `update` / `removed`)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod device_kind;
pub mod feed;
pub mod minion;
pub mod network;
pub mod status;
