// HTTP request handlers
use crate::domain::display::DisplayState;
use crate::domain::race::RaceCategory;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Json, Router,
};
use futures::stream::Stream;
use futures::StreamExt;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/races", get(get_races))
        .route("/races/stream", get(stream_races))
        .route("/filters", delete(clear_filters))
        .route("/filters/:category", post(toggle_filter))
        .route("/message/dismiss", post(dismiss_message))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current display state snapshot
pub async fn get_races(State(state): State<Arc<AppState>>) -> Json<DisplayState> {
    Json(state.races.snapshot())
}

/// Display state as Server-Sent Events, one event per published change
pub async fn stream_races(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(state.races.subscribe())
        .map(|display| Event::default().event("display_state").json_data(&display));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn toggle_filter(
    Path(category): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    let category: RaceCategory = category
        .parse()
        .map_err(|e: crate::domain::race::UnknownCategory| ApiError::BadRequest(e.to_string()))?;

    state
        .races
        .toggle_filter(category)
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn clear_filters(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state
        .races
        .clear_filters()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn dismiss_message(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state
        .races
        .dismiss_message()
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;
    Ok(StatusCode::ACCEPTED)
}
