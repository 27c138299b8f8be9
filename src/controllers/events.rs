use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::duration;
use crate::services::events::{self, EventError};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event).delete(cancel_event))
}

// POST /api/events
#[derive(Debug, Deserialize)]
struct CreateEventRequest {
    name: String,
    date: DateTime<Utc>,
    total_seats: i32,
    booking_ttl: String,
    #[serde(default)]
    requires_payment: bool,
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, EventError> {
    let ttl = duration::parse(&req.booking_ttl).map_err(|_| EventError::InvalidTtl)?;
    let event = events::create_event(
        &state,
        req.name,
        req.date,
        req.total_seats,
        ttl.as_secs() as i64,
        req.requires_payment,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// GET /api/events
async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, EventError> {
    let events = events::list_events(&state).await?;
    Ok(Json(events))
}

// GET /api/events/{id}
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, EventError> {
    let event = events::get_event(&state, id).await?;
    Ok(Json(event))
}

// DELETE /api/events/{id} - отмена мероприятия с каскадной отменой броней
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CancelEventRequest {
    reason: String,
}

async fn cancel_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelEventRequest>>,
) -> Result<impl IntoResponse, EventError> {
    let reason = body.map(|Json(b)| b.reason).unwrap_or_default();
    events::cancel_event(&state, id, reason).await?;
    Ok(Json(json!({
        "message": "Event cancelled successfully",
        "event_id": id,
    })))
}
