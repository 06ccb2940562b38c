//! # minionhub-adapter-virtual
//!
//! Simulated collaborators for the minion core, used by the daemon when no
//! real device protocol is wired in, and by end-to-end tests.
//!
//! ## Provided device kinds
//!
//! | Brand | Model | Minion type | Token | Shared mac |
//! |-------|-------|-------------|-------|------------|
//! | `virtual` | `toggle` | toggle | no | no |
//! | `virtual` | `switch` | switch | no | no |
//! | `virtual` | `secure-switch` | switch | yes | no |
//! | `virtual` | `light` | light | no | no |
//! | `virtual` | `ir-blaster` | air conditioning | no | yes |
//!
//! ## Dependency rule
//!
//! Depends on `minionhub-app` (port traits) and `minionhub-domain` only.

mod driver;
mod kinds;
mod network;

pub use driver::VirtualDriver;
pub use kinds::default_kinds;
pub use network::VirtualNetwork;
