//! Server-Sent Events (SSE) stream of the minion feed.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use minionhub_app::ports::{DeviceDriver, MinionRepository, NetworkDiscovery};

use crate::state::AppState;

/// `GET /api/feed/minions`: SSE stream of minion lifecycle events.
///
/// The last published event is sent first, then every later one, each as a
/// JSON `data:` frame. The stream continues until the client disconnects.
pub async fn minions<R, D, N>(
    State(state): State<AppState<R, D, N>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>
where
    R: MinionRepository + Send + Sync + 'static,
    D: DeviceDriver + Send + Sync + 'static,
    N: NetworkDiscovery + Send + Sync + 'static,
{
    let events = state
        .minion_service
        .subscribe_feed()
        .into_stream()
        .filter_map(|result| match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(err) => {
                    tracing::warn!(%err, "failed to serialize feed event for SSE stream");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "SSE subscriber lagged, some feed events were dropped");
                None
            }
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::testing::test_app;

    #[tokio::test]
    async fn should_replay_latest_event_as_first_frame() {
        let app = test_app();
        let create = Request::builder()
            .method("POST")
            .uri("/api/minions")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"name":"Plug","device":{"physical_device":{"mac":"aa:02"},"brand":"virtual","model":"switch"}}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/feed/minions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );

        let mut body = response.into_body();
        let frame = body.frame().await.unwrap().unwrap();
        let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert!(text.starts_with("data: "));
        assert!(text.contains(r#""event":"created""#));
        assert!(text.contains(r#""name":"Plug""#));
    }
}
