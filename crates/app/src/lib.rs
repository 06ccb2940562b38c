//! # minionhub-app
//!
//! Application layer: the minion synchronization core and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** for the collaborators the core consumes:
//!   - `MinionRepository`: durable store for minion records
//!   - `DeviceDriver`: reads/writes physical status, owns the device-kind table,
//!     pushes device-originated status changes
//!   - `NetworkDiscovery`: rescans the LAN, lists reachable devices, pushes updates
//! - Provide the core components:
//!   - `Registry`: authoritative in-memory arena of minions, keyed by id
//!   - `validator`: admission control for new minions
//!   - `reconciler`: merges discovery facts into bound minions
//!   - `StatusSynchronizer`: sequential, rate-limited status polling
//!   - `MinionFeed`: replay-latest broadcast of lifecycle events
//! - Expose the `MinionService` facade, the only surface presentation layers call
//!
//! ## Dependency rule
//! Depends on `minionhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod feed;
pub mod ports;
pub mod reconciler;
pub mod registry;
pub mod services;
pub mod synchronizer;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;
