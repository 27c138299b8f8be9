use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::UserRole;
use crate::services::users::{self, UserError};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(register))
        .route("/users/{id}", get(get_user))
}

// POST /api/users
#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(email)]
    email: String,
    #[serde(default)]
    telegram: String,
    #[serde(default)]
    role: UserRole,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, UserError> {
    req.validate()
        .map_err(|e| UserError::Validation(e.to_string()))?;
    let user = users::register(&state, req.email, req.telegram, req.role).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/users/{id}
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UserError> {
    let user = users::get_user(&state, id).await?;
    Ok(Json(user))
}
