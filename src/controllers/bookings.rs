use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::bookings::{self, BookingError};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events/{id}/book", post(book_place))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}/confirm", post(confirm_booking))
        .route("/bookings/{id}", delete(cancel_booking))
}

// POST /api/events/{id}/book
#[derive(Debug, Deserialize)]
struct BookRequest {
    user_id: Uuid,
}

async fn book_place(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<Uuid>,
    Json(req): Json<BookRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let booking = bookings::book_place(&state, event_id, req.user_id).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings - админский список с event_name и user_email
async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let bookings = bookings::list_bookings(&state).await?;
    Ok(Json(bookings))
}

// POST /api/bookings/{id}/confirm
async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    bookings::confirm_booking(&state, id).await?;
    Ok(Json(json!({
        "message": "Booking confirmed successfully",
        "booking_id": id,
    })))
}

// DELETE /api/bookings/{id}
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    bookings::cancel_booking(&state, id).await?;
    Ok(Json(json!({
        "message": "Booking cancelled successfully",
        "booking_id": id,
    })))
}
