use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Json,
        sse::{Event, Sse},
    },
    routing::{get, post},
};
use futures::Stream;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use application::LightMode;
use domain::DomainError;
use domain::sensor::PushParams;

use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // The cloud service calls back with the event name in the path and
        // readings in the query string
        .route("/push/{address}/{event}", get(push_callback).post(push_callback))
        .route("/api/tags", get(get_tags))
        .route("/api/tags/{address}", get(get_tag))
        .route("/api/tags/{address}/query", post(query_tag))
        .route("/api/tags/{address}/light", post(set_light))
        .route("/api/events", get(sse_handler))
        .layer(cors)
        .with_state(state)
}

fn error_response(error: DomainError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &error {
        DomainError::TagNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::UnknownEvent(_) => StatusCode::BAD_REQUEST,
        DomainError::CommandFailed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(json!({ "error": error.to_string() })))
}

async fn push_callback(
    Path((address, event)): Path<(String, String)>,
    Query(params): Query<PushParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.manager.push(&address, &event, params).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => error_response(e),
    }
}

async fn get_tags(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.manager.snapshots().await)
}

async fn get_tag(
    Path(address): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.manager.snapshot(&address).await {
        Ok(snapshot) => (StatusCode::OK, Json(json!(snapshot))),
        Err(e) => error_response(e),
    }
}

async fn query_tag(
    Path(address): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.manager.query(&address).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => error_response(e),
    }
}

async fn set_light(
    Path(address): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let Some(mode) = payload
        .get("value")
        .and_then(|v| v.as_i64())
        .and_then(LightMode::from_value)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "value must be 0 (off), 1 (on) or 2 (flash)" })),
        );
    };

    match state.manager.set_light(&address, mode).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => error_response(e),
    }
}

async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx).map(|msg| match msg {
        Ok(event) => Event::default()
            .json_data(event)
            .map_err(|_| axum::Error::new("Serialization error")),
        Err(_) => Ok(Event::default().comment("keep-alive")),
    });

    Sse::new(stream)
        .keep_alive(axum::response::sse::KeepAlive::new().interval(Duration::from_secs(15)))
}
