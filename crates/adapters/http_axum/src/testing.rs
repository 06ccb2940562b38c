//! Router fixtures backed by the virtual adapter and an in-memory store.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;

use minionhub_adapter_virtual::{VirtualDriver, VirtualNetwork};
use minionhub_app::ports::MinionRepository;
use minionhub_app::services::minion_service::{MinionService, SyncSettings};
use minionhub_domain::error::MinionHubError;
use minionhub_domain::id::MinionId;
use minionhub_domain::minion::Minion;
use minionhub_domain::network::LocalNetworkDevice;

use crate::router;
use crate::state::AppState;

#[derive(Default)]
pub struct MemoryRepo {
    store: Mutex<Vec<Minion>>,
}

impl MinionRepository for MemoryRepo {
    fn get_all(&self) -> impl Future<Output = Result<Vec<Minion>, MinionHubError>> + Send {
        let all = self.store.lock().unwrap().clone();
        async { Ok(all) }
    }

    fn create(
        &self,
        minion: Minion,
    ) -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        self.store.lock().unwrap().push(minion.clone());
        async { Ok(minion) }
    }

    fn update(
        &self,
        minion: Minion,
    ) -> impl Future<Output = Result<Minion, MinionHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        if let Some(slot) = store.iter_mut().find(|m| m.id == minion.id) {
            *slot = minion.clone();
        }
        async { Ok(minion) }
    }

    fn delete(&self, id: MinionId) -> impl Future<Output = Result<(), MinionHubError>> + Send {
        self.store.lock().unwrap().retain(|m| m.id != id);
        async { Ok(()) }
    }
}

pub fn test_app_with_driver(driver: VirtualDriver) -> Router {
    let network = VirtualNetwork::new(vec![
        LocalNetworkDevice::new("aa:01", "lamp", "10.0.0.1"),
        LocalNetworkDevice::new("aa:02", "plug", "10.0.0.2"),
    ]);
    let service = MinionService::new(
        MemoryRepo::default(),
        driver,
        network,
        SyncSettings {
            inter_device_delay: Duration::from_millis(1),
            feed_capacity: 16,
        },
    );
    router::build(AppState::new(service))
}

pub fn test_app() -> Router {
    test_app_with_driver(VirtualDriver::default())
}
