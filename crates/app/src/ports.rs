//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the core and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod discovery;
pub mod driver;
pub mod storage;

pub use discovery::NetworkDiscovery;
pub use driver::{DeviceDriver, StatusChange};
pub use storage::MinionRepository;
