//! JSON REST handlers for minions.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use minionhub_app::ports::{DeviceDriver, MinionRepository, NetworkDiscovery};
use minionhub_domain::error::{MinionHubError, NotFoundError};
use minionhub_domain::id::MinionId;
use minionhub_domain::minion::{Minion, NewMinion};
use minionhub_domain::status::MinionStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for the timeout endpoint. A missing value clears the timeout.
#[derive(Deserialize)]
pub struct SetTimeoutRequest {
    #[serde(default)]
    pub auto_turn_off_ms: Option<u64>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Minion>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from endpoints returning a single minion.
pub enum MinionResponse {
    Ok(Json<Minion>),
    Created(Json<Minion>),
}

impl IntoResponse for MinionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from endpoints without a body.
pub enum EmptyResponse {
    NoContent,
}

impl IntoResponse for EmptyResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// An id that does not parse cannot name an existing minion.
fn parse_id(raw: &str) -> Result<MinionId, ApiError> {
    MinionId::from_str(raw).map_err(|_| {
        ApiError::from(MinionHubError::from(NotFoundError {
            entity: "Minion",
            id: raw.to_string(),
        }))
    })
}

/// `GET /api/minions`
pub async fn list<R, D, N>(State(state): State<AppState<R, D, N>>) -> ListResponse
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    ListResponse::Ok(Json(state.minion_service.list_minions()))
}

/// `GET /api/minions/{id}`
pub async fn get<R, D, N>(
    State(state): State<AppState<R, D, N>>,
    Path(id): Path<String>,
) -> Result<MinionResponse, ApiError>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    let minion = state.minion_service.get_minion(parse_id(&id)?)?;
    Ok(MinionResponse::Ok(Json(minion)))
}

/// `POST /api/minions`
pub async fn create<R, D, N>(
    State(state): State<AppState<R, D, N>>,
    Json(candidate): Json<NewMinion>,
) -> Result<MinionResponse, ApiError>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    let created = state.minion_service.create_minion(candidate).await?;
    Ok(MinionResponse::Created(Json(created)))
}

/// `PUT /api/minions/{id}`
pub async fn set_status<R, D, N>(
    State(state): State<AppState<R, D, N>>,
    Path(id): Path<String>,
    Json(status): Json<MinionStatus>,
) -> Result<MinionResponse, ApiError>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let minion = state.minion_service.set_status(id, status).await?;
    Ok(MinionResponse::Ok(Json(minion)))
}

/// `PUT /api/minions/timeout/{id}`
pub async fn set_timeout<R, D, N>(
    State(state): State<AppState<R, D, N>>,
    Path(id): Path<String>,
    Json(req): Json<SetTimeoutRequest>,
) -> Result<MinionResponse, ApiError>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let minion = state
        .minion_service
        .set_timeout(id, req.auto_turn_off_ms)
        .await?;
    Ok(MinionResponse::Ok(Json(minion)))
}

/// `DELETE /api/minions/{id}`
pub async fn delete<R, D, N>(
    State(state): State<AppState<R, D, N>>,
    Path(id): Path<String>,
) -> Result<EmptyResponse, ApiError>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    state.minion_service.delete_minion(parse_id(&id)?).await?;
    Ok(EmptyResponse::NoContent)
}

/// `POST /api/minions/rescan`
pub async fn rescan_all<R, D, N>(State(state): State<AppState<R, D, N>>) -> EmptyResponse
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    state.minion_service.rescan_all().await;
    EmptyResponse::NoContent
}

/// `POST /api/minions/rescan/{id}`
pub async fn rescan_one<R, D, N>(
    State(state): State<AppState<R, D, N>>,
    Path(id): Path<String>,
) -> Result<EmptyResponse, ApiError>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    state.minion_service.rescan_one(parse_id(&id)?).await?;
    Ok(EmptyResponse::NoContent)
}
