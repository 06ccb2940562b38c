//! JSON REST API handlers.

#[allow(clippy::missing_errors_doc)]
pub mod feed;
#[allow(clippy::missing_errors_doc)]
pub mod minions;

use axum::Router;
use axum::routing::{get, post, put};

use minionhub_app::ports::{DeviceDriver, MinionRepository, NetworkDiscovery};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, D, N>() -> Router<AppState<R, D, N>>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/minions",
            get(minions::list::<R, D, N>).post(minions::create::<R, D, N>),
        )
        .route("/minions/rescan", post(minions::rescan_all::<R, D, N>))
        .route("/minions/rescan/{id}", post(minions::rescan_one::<R, D, N>))
        .route("/minions/timeout/{id}", put(minions::set_timeout::<R, D, N>))
        .route(
            "/minions/{id}",
            get(minions::get::<R, D, N>)
                .put(minions::set_status::<R, D, N>)
                .delete(minions::delete::<R, D, N>),
        )
        .route("/feed/minions", get(feed::minions::<R, D, N>))
}
