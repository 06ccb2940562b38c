//! Shared application state for axum handlers.

use std::sync::Arc;

use minionhub_app::ports::{DeviceDriver, MinionRepository, NetworkDiscovery};
use minionhub_app::services::minion_service::MinionService;

/// Application state shared across all axum handlers.
///
/// Generic over the three collaborators to avoid dynamic dispatch.
/// `Clone` is implemented manually so the collaborators themselves do not
/// need to be `Clone`, only the `Arc` wrapper is cloned.
pub struct AppState<R, D, N> {
    pub minion_service: Arc<MinionService<R, D, N>>,
}

impl<R, D, N> Clone for AppState<R, D, N> {
    fn clone(&self) -> Self {
        Self {
            minion_service: Arc::clone(&self.minion_service),
        }
    }
}

impl<R, D, N> AppState<R, D, N>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    pub fn new(minion_service: MinionService<R, D, N>) -> Self {
        Self::from_arc(Arc::new(minion_service))
    }

    /// Create the state from a service already shared with background tasks.
    pub fn from_arc(minion_service: Arc<MinionService<R, D, N>>) -> Self {
        Self { minion_service }
    }
}
