//! Network discovery port: which physical devices are reachable right now.
//!
//! How the LAN is scanned is up to the adapter; the core only consumes the
//! resulting `(mac, name, ip)` list and its updates.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;

use minionhub_domain::error::MinionHubError;
use minionhub_domain::network::LocalNetworkDevice;

/// Source of physically reachable devices.
pub trait NetworkDiscovery {
    /// Trigger a fresh scan of the local network.
    fn rescan(&self) -> impl Future<Output = Result<(), MinionHubError>> + Send;

    /// Current snapshot of reachable devices.
    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<LocalNetworkDevice>, MinionHubError>> + Send;

    /// Subscribe to updated device lists (name or ip changes, new devices).
    fn subscribe_updates(&self) -> broadcast::Receiver<Vec<LocalNetworkDevice>>;
}

impl<T: NetworkDiscovery + Send + Sync> NetworkDiscovery for Arc<T> {
    fn rescan(&self) -> impl Future<Output = Result<(), MinionHubError>> + Send {
        (**self).rescan()
    }

    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<LocalNetworkDevice>, MinionHubError>> + Send {
        (**self).list_devices()
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<Vec<LocalNetworkDevice>> {
        (**self).subscribe_updates()
    }
}
