//! Virtual device driver: an in-memory status table per physical device.
//!
//! Exclusive devices keep one status per mac. A shared (logic) device keeps
//! one status per minion bound to it, since each minion drives a different
//! appliance through the same transmitter.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use minionhub_app::ports::{DeviceDriver, StatusChange};
use minionhub_domain::device_kind::{self, DeviceKind};
use minionhub_domain::error::DriverError;
use minionhub_domain::minion::Minion;
use minionhub_domain::status::MinionStatus;

use crate::kinds::default_kinds;

const CHANGE_CAPACITY: usize = 64;

/// Simulated driver dispatcher.
pub struct VirtualDriver {
    kinds: Vec<DeviceKind>,
    statuses: Mutex<HashMap<String, MinionStatus>>,
    offline: Mutex<HashSet<String>>,
    changes: broadcast::Sender<StatusChange>,
}

impl Default for VirtualDriver {
    fn default() -> Self {
        Self::new(default_kinds())
    }
}

impl VirtualDriver {
    #[must_use]
    pub fn new(kinds: Vec<DeviceKind>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            kinds,
            statuses: Mutex::new(HashMap::new()),
            offline: Mutex::new(HashSet::new()),
            changes,
        }
    }

    /// Make the device at `mac` stop (or resume) answering.
    pub fn set_offline(&self, mac: &str, offline: bool) {
        let mac = mac.to_ascii_lowercase();
        let mut set = lock(&self.offline);
        if offline {
            set.insert(mac);
        } else {
            set.remove(&mac);
        }
    }

    /// Pretend the device at `mac` changed on its own, e.g. a wall switch
    /// was pressed, and report it to subscribers.
    pub fn simulate_status_change(&self, mac: &str, status: MinionStatus) {
        lock(&self.statuses).insert(mac.to_ascii_lowercase(), status);
        tracing::debug!(mac, "virtual device changed status");
        // no subscribers is fine
        let _ = self.changes.send(StatusChange {
            mac: mac.to_string(),
            status,
        });
    }

    fn resolve(&self, minion: &Minion) -> Result<(&DeviceKind, String), DriverError> {
        let device = &minion.device;
        let kind = device_kind::lookup(&self.kinds, &device.brand, &device.model).ok_or_else(
            || DriverError::UnsupportedDevice {
                brand: device.brand.clone(),
                model: device.model.clone(),
            },
        )?;

        let mac = device.mac().to_ascii_lowercase();
        if lock(&self.offline).contains(&mac) {
            return Err(DriverError::Unreachable { mac });
        }

        let key = if kind.is_used_as_logic_device {
            format!("{mac}/{}", minion.id)
        } else {
            mac
        };
        Ok((kind, key))
    }

    fn read(&self, minion: &Minion) -> Result<MinionStatus, DriverError> {
        let (kind, key) = self.resolve(minion)?;
        Ok(lock(&self.statuses)
            .get(&key)
            .copied()
            .unwrap_or_else(|| MinionStatus::default_for(kind.supported_minion_type)))
    }

    fn write(&self, minion: &Minion, status: MinionStatus) -> Result<(), DriverError> {
        let (kind, key) = self.resolve(minion)?;
        if status.minion_type() != kind.supported_minion_type {
            return Err(DriverError::Rejected {
                mac: minion.device.mac().to_string(),
                reason: format!("{} status sent to a {} device", status.minion_type(), kind.supported_minion_type),
            });
        }
        lock(&self.statuses).insert(key, status);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DeviceDriver for VirtualDriver {
    fn device_kinds(&self) -> &[DeviceKind] {
        &self.kinds
    }

    fn get_status(
        &self,
        minion: &Minion,
    ) -> impl Future<Output = Result<MinionStatus, DriverError>> + Send {
        let result = self.read(minion);
        async { result }
    }

    fn set_status(
        &self,
        minion: &Minion,
        status: MinionStatus,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        let result = self.write(minion, status);
        async { result }
    }

    fn subscribe_status_changes(&self) -> broadcast::Receiver<StatusChange> {
        self.changes.subscribe()
    }
}
