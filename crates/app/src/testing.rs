//! Shared fixtures and in-memory fakes for the app crate's tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{Notify, broadcast};

use minionhub_domain::device_kind::DeviceKind;
use minionhub_domain::error::{DriverError, MinionHubError};
use minionhub_domain::id::MinionId;
use minionhub_domain::minion::{Minion, MinionDevice, NewMinion};
use minionhub_domain::network::LocalNetworkDevice;
use minionhub_domain::status::{MinionStatus, MinionType};

use crate::ports::{DeviceDriver, MinionRepository, NetworkDiscovery, StatusChange};

fn model_for(minion_type: MinionType) -> &'static str {
    match minion_type {
        MinionType::Toggle | MinionType::Switch => "plug",
        MinionType::Light => "bulb",
        MinionType::AirConditioning => "ir-blaster",
    }
}

/// A registered minion of the given type bound to `mac`.
pub fn minion(name: &str, minion_type: MinionType, mac: &str) -> Minion {
    Minion::builder()
        .name(name)
        .minion_type(minion_type)
        .brand("acme")
        .model(model_for(minion_type))
        .mac(mac)
        .build()
        .unwrap()
}

/// A client candidate with no type claim and no token.
pub fn candidate(name: &str, brand: &str, model: &str, mac: &str) -> NewMinion {
    NewMinion {
        name: name.to_string(),
        minion_type: None,
        device: MinionDevice {
            physical_device: LocalNetworkDevice::new(mac, "", ""),
            brand: brand.to_string(),
            model: model.to_string(),
            token: None,
        },
        auto_turn_off_ms: None,
    }
}

fn kind(model: &str, minion_type: MinionType, token: bool, shared: bool) -> DeviceKind {
    DeviceKind {
        brand: "acme".to_string(),
        model: model.to_string(),
        supported_minion_type: minion_type,
        is_token_required: token,
        is_used_as_logic_device: shared,
    }
}

/// Kinds known to [`FakeDriver`].
pub fn device_kinds() -> Vec<DeviceKind> {
    vec![
        kind("bulb", MinionType::Light, false, false),
        kind("plug", MinionType::Switch, false, false),
        kind("secure-plug", MinionType::Switch, true, false),
        kind("ir-blaster", MinionType::AirConditioning, false, true),
    ]
}

fn storage_failure() -> MinionHubError {
    MinionHubError::Storage(Box::new(std::io::Error::other("store offline")))
}

#[derive(Default)]
pub struct InMemoryMinionRepo {
    store: Mutex<Vec<Minion>>,
    failing: AtomicBool,
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
    load_gate: Mutex<Option<Arc<Notify>>>,
}

impl InMemoryMinionRepo {
    pub fn seeded(minions: Vec<Minion>) -> Self {
        Self {
            store: Mutex::new(minions),
            ..Self::default()
        }
    }

    /// Make the next `get_all` wait until the returned gate is notified.
    pub fn hold_next_load(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.load_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<Minion> {
        self.store.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

impl MinionRepository for InMemoryMinionRepo {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Minion>, MinionHubError>> + Send {
        let gate = self.load_gate.lock().unwrap().take();
        let result = if self.is_failing() {
            Err(storage_failure())
        } else {
            Ok(self.stored())
        };
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            result
        }
    }

    fn create(
        &self,
        minion: Minion,
    ) -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let result = if self.is_failing() {
            Err(storage_failure())
        } else {
            self.store.lock().unwrap().push(minion.clone());
            Ok(minion)
        };
        async { result }
    }

    fn update(
        &self,
        minion: Minion,
    ) -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let result = if self.is_failing() {
            Err(storage_failure())
        } else {
            let mut store = self.store.lock().unwrap();
            if let Some(slot) = store.iter_mut().find(|m| m.id == minion.id) {
                *slot = minion.clone();
            }
            Ok(minion)
        };
        async { result }
    }

    fn delete(&self, id: MinionId) -> impl Future<Output = Result<(), MinionHubError>> + Send {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let result = if self.is_failing() {
            Err(storage_failure())
        } else {
            self.store.lock().unwrap().retain(|m| m.id != id);
            Ok(())
        };
        async { result }
    }
}

pub struct FakeDriver {
    kinds: Vec<DeviceKind>,
    statuses: Mutex<HashMap<String, MinionStatus>>,
    unreachable: Mutex<HashSet<String>>,
    changes: broadcast::Sender<StatusChange>,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl Default for FakeDriver {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            kinds: device_kinds(),
            statuses: Mutex::new(HashMap::new()),
            unreachable: Mutex::new(HashSet::new()),
            changes,
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        }
    }
}

impl FakeDriver {
    /// Status the device at `mac` reports from now on.
    pub fn set_device_status(&self, mac: &str, status: MinionStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(mac.to_ascii_lowercase(), status);
    }

    pub fn set_unreachable(&self, mac: &str) {
        self.unreachable
            .lock()
            .unwrap()
            .insert(mac.to_ascii_lowercase());
    }

    /// Emit a device-originated change.
    pub fn push(&self, mac: &str, status: MinionStatus) {
        let _ = self.changes.send(StatusChange {
            mac: mac.to_string(),
            status,
        });
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    fn check_reachable(&self, minion: &Minion) -> Result<String, DriverError> {
        let mac = minion.device.mac().to_ascii_lowercase();
        if self.unreachable.lock().unwrap().contains(&mac) {
            return Err(DriverError::Unreachable { mac });
        }
        Ok(mac)
    }
}

impl DeviceDriver for FakeDriver {
    fn device_kinds(&self) -> &[DeviceKind] {
        &self.kinds
    }

    fn get_status(
        &self,
        minion: &Minion,
    ) -> impl Future<Output = Result<MinionStatus, DriverError>> + Send {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let result = self.check_reachable(minion).map(|mac| {
            self.statuses
                .lock()
                .unwrap()
                .get(&mac)
                .copied()
                .unwrap_or_else(|| MinionStatus::default_for(minion.minion_type))
        });
        async { result }
    }

    fn set_status(
        &self,
        minion: &Minion,
        status: MinionStatus,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.sets.fetch_add(1, Ordering::SeqCst);
        let result = self.check_reachable(minion).map(|mac| {
            self.statuses.lock().unwrap().insert(mac, status);
        });
        async { result }
    }

    fn subscribe_status_changes(&self) -> broadcast::Receiver<StatusChange> {
        self.changes.subscribe()
    }
}

pub struct FakeDiscovery {
    devices: Mutex<Vec<LocalNetworkDevice>>,
    updates: broadcast::Sender<Vec<LocalNetworkDevice>>,
    rescans: AtomicUsize,
    failing: AtomicBool,
}

impl Default for FakeDiscovery {
    fn default() -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            devices: Mutex::new(Vec::new()),
            updates,
            rescans: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }
}

impl FakeDiscovery {
    pub fn with_devices(devices: Vec<LocalNetworkDevice>) -> Self {
        let discovery = Self::default();
        *discovery.devices.lock().unwrap() = devices;
        discovery
    }

    /// Replace the visible devices and broadcast the new list.
    pub fn set_devices(&self, devices: Vec<LocalNetworkDevice>) {
        *self.devices.lock().unwrap() = devices.clone();
        let _ = self.updates.send(devices);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn rescan_calls(&self) -> usize {
        self.rescans.load(Ordering::SeqCst)
    }

    fn failure() -> MinionHubError {
        MinionHubError::Discovery(Box::new(std::io::Error::other("lan scan failed")))
    }
}

impl NetworkDiscovery for FakeDiscovery {
    fn rescan(&self) -> impl Future<Output = Result<(), MinionHubError>> + Send {
        self.rescans.fetch_add(1, Ordering::SeqCst);
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(Self::failure())
        } else {
            Ok(())
        };
        async { result }
    }

    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<LocalNetworkDevice>, MinionHubError>> + Send {
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(Self::failure())
        } else {
            Ok(self.devices.lock().unwrap().clone())
        };
        async { result }
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<Vec<LocalNetworkDevice>> {
        self.updates.subscribe()
    }
}
