//! Регистрация и чтение пользователей. Email уникален; дубликат ловится
//! по нарушению ограничения БД, а не предварительным SELECT.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{User, UserRole};
use crate::AppState;
use std::sync::Arc;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,
    #[error("Email is already registered")]
    EmailTaken,
    #[error("{0}")]
    Validation(String),
    #[error("Database error")]
    Db(sqlx::Error),
}

impl UserError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::EmailTaken => StatusCode::CONFLICT,
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        if let UserError::Db(e) = &self {
            error!("user sql error: {e:?}");
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<sqlx::Error> for UserError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return UserError::EmailTaken;
            }
        }
        UserError::Db(e)
    }
}

pub async fn register(
    state: &Arc<AppState>,
    email: String,
    telegram: String,
    role: UserRole,
) -> Result<User, UserError> {
    let user = User {
        id: Uuid::new_v4(),
        email,
        telegram,
        role,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, email, telegram, role, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.telegram)
    .bind(user.role)
    .bind(user.created_at)
    .execute(&state.db.pool)
    .await?;

    info!(user_id = %user.id, "User registered");
    Ok(user)
}

pub async fn get_user(state: &Arc<AppState>, id: Uuid) -> Result<User, UserError> {
    User::find_by_id(id, &state.db)
        .await
        .map_err(UserError::from)?
        .ok_or(UserError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes_match_contract() {
        assert_eq!(UserError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(UserError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            UserError::Validation("bad email".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn validation_message_passes_through_verbatim() {
        let err = UserError::Validation("email: не похоже на адрес".into());
        assert_eq!(err.to_string(), "email: не похоже на адрес");
    }
}
