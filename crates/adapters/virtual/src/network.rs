//! Virtual network discovery: a configurable list of reachable devices.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use minionhub_app::ports::NetworkDiscovery;
use minionhub_domain::error::MinionHubError;
use minionhub_domain::network::LocalNetworkDevice;

const UPDATE_CAPACITY: usize = 16;

/// Simulated local network.
pub struct VirtualNetwork {
    devices: Mutex<Vec<LocalNetworkDevice>>,
    updates: broadcast::Sender<Vec<LocalNetworkDevice>>,
}

impl Default for VirtualNetwork {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl VirtualNetwork {
    #[must_use]
    pub fn new(devices: Vec<LocalNetworkDevice>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            devices: Mutex::new(devices),
            updates,
        }
    }

    /// Replace the reachable devices and announce the new list.
    pub fn set_devices(&self, devices: Vec<LocalNetworkDevice>) {
        *self.lock() = devices.clone();
        let _ = self.updates.send(devices);
    }

    /// Add a device, or refresh the one with the same mac, and announce it.
    pub fn upsert_device(&self, device: LocalNetworkDevice) {
        let snapshot = {
            let mut devices = self.lock();
            match devices.iter_mut().find(|d| d.has_mac(&device.mac)) {
                Some(existing) => *existing = device,
                None => devices.push(device),
            }
            devices.clone()
        };
        let _ = self.updates.send(snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LocalNetworkDevice>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NetworkDiscovery for VirtualNetwork {
    /// A scan finds exactly the configured devices and announces them.
    fn rescan(&self) -> impl Future<Output = Result<(), MinionHubError>> + Send {
        let snapshot = self.lock().clone();
        tracing::debug!(devices = snapshot.len(), "virtual network scanned");
        let _ = self.updates.send(snapshot);
        async { Ok(()) }
    }

    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<LocalNetworkDevice>, MinionHubError>> + Send {
        let snapshot = self.lock().clone();
        async { Ok(snapshot) }
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<Vec<LocalNetworkDevice>> {
        self.updates.subscribe()
    }
}
