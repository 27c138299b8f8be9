//! bookings.rs
//!
//! Жизненный цикл брони: pending -> confirmed | cancelled. Подтверждение
//! возможно только до дедлайна `expires_at`; просроченные pending-брони
//! отменяет фоновый обработчик (см. sweeper.rs). Место возвращается в пул
//! мероприятия при любой отмене.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, BookingView, User};
use crate::AppState;
use std::sync::Arc;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Event not found")]
    EventNotFound,
    #[error("No seats available")]
    NoSeatsAvailable,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("Booking is not pending confirmation")]
    NotPending,
    #[error("Booking has expired")]
    Expired,
    #[error("Booking is already cancelled")]
    AlreadyCancelled,
    #[error("Database error")]
    Db(#[from] sqlx::Error),
}

impl BookingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookingError::EventNotFound | BookingError::BookingNotFound => StatusCode::NOT_FOUND,
            BookingError::NoSeatsAvailable | BookingError::AlreadyCancelled => {
                StatusCode::CONFLICT
            }
            BookingError::NotPending => StatusCode::BAD_REQUEST,
            BookingError::Expired => StatusCode::GONE,
            BookingError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        if let BookingError::Db(e) = &self {
            error!("booking sql error: {e:?}");
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Пускать ли бронь в confirmed. Дедлайн проверяется здесь, а не в SQL,
/// чтобы вернуть клиенту различимую ошибку 410.
pub(crate) fn confirm_guard(
    status: BookingStatus,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), BookingError> {
    if status != BookingStatus::Pending {
        return Err(BookingError::NotPending);
    }
    if now > expires_at {
        return Err(BookingError::Expired);
    }
    Ok(())
}

/// Пускать ли бронь в cancelled: повторная отмена отклоняется; отмена
/// подтвержденной брони разрешена (админский сценарий) и вернет место в пул.
pub(crate) fn cancel_guard(status: BookingStatus) -> Result<(), BookingError> {
    if status == BookingStatus::Cancelled {
        return Err(BookingError::AlreadyCancelled);
    }
    Ok(())
}

/// Забронировать место на мероприятии. Списание места и вставка брони идут
/// одной транзакцией; условный UPDATE разрешает гонку за последнее место.
pub async fn book_place(
    state: &Arc<AppState>,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Booking, BookingError> {
    let mut tx = state.db.pool.begin().await?;

    let ttl_secs: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE events
        SET available = available - 1, updated_at = NOW()
        WHERE id = $1 AND status = 'active' AND available > 0
        RETURNING booking_ttl_secs
        "#,
    )
    .bind(event_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(ttl_secs) = ttl_secs else {
        // различаем "нет мероприятия" и "мест не осталось"
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1 AND status = 'active')",
        )
        .bind(event_id)
        .fetch_one(&state.db.pool)
        .await?;
        return Err(if exists {
            BookingError::NoSeatsAvailable
        } else {
            BookingError::EventNotFound
        });
    };

    let now = Utc::now();
    let booking = Booking {
        id: Uuid::new_v4(),
        event_id,
        user_id,
        status: BookingStatus::Pending,
        created_at: now,
        expires_at: now + Duration::seconds(ttl_secs),
        confirmed_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO bookings (id, event_id, user_id, status, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(booking.id)
    .bind(booking.event_id)
    .bind(booking.user_id)
    .bind(booking.status)
    .bind(booking.created_at)
    .bind(booking.expires_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        booking_id = %booking.id,
        event_id = %event_id,
        user_id = %user_id,
        "Booking created"
    );
    Ok(booking)
}

/// Подтвердить бронь. Просроченная бронь не мутируется - ее переведет
/// в cancelled фоновый обработчик.
pub async fn confirm_booking(
    state: &Arc<AppState>,
    booking_id: Uuid,
) -> Result<Booking, BookingError> {
    let booking = Booking::find_by_id(booking_id, &state.db)
        .await?
        .ok_or(BookingError::BookingNotFound)?;

    confirm_guard(booking.status, booking.expires_at, Utc::now())?;

    // условие status = 'pending' закрывает гонку с отменой/свипером
    let confirmed: Booking = sqlx::query_as(
        r#"
        UPDATE bookings
        SET status = 'confirmed', confirmed_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(BookingError::NotPending)?;

    info!(booking_id = %booking_id, "Booking confirmed");
    notify_owner(state.clone(), confirmed.clone(), NotifyKind::Confirmed);
    Ok(confirmed)
}

/// Отменить бронь (явно или по истечении TTL). Возвращает место в пул.
pub async fn cancel_booking(
    state: &Arc<AppState>,
    booking_id: Uuid,
) -> Result<Booking, BookingError> {
    let mut tx = state.db.pool.begin().await?;

    let booking: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::BookingNotFound)?;

    cancel_guard(booking.status)?;

    let cancelled: Booking = sqlx::query_as(
        "UPDATE bookings SET status = 'cancelled' WHERE id = $1 RETURNING *",
    )
    .bind(booking_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE events
        SET available = LEAST(available + 1, total_seats), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(booking.event_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(booking_id = %booking_id, "Booking cancelled");
    notify_owner(state.clone(), cancelled.clone(), NotifyKind::Cancelled);
    Ok(cancelled)
}

/// Админский список броней с денормализованными именем мероприятия и email.
pub async fn list_bookings(state: &Arc<AppState>) -> Result<Vec<BookingView>, BookingError> {
    let rows: Vec<BookingView> = sqlx::query_as(
        r#"
        SELECT b.id,
               e.name AS event_name,
               u.email AS user_email,
               b.status,
               b.created_at,
               CASE WHEN b.status = 'pending' THEN b.expires_at END AS expires_at
        FROM bookings b
        JOIN events e ON e.id = b.event_id
        JOIN users u ON u.id = b.user_id
        ORDER BY b.created_at DESC
        "#,
    )
    .fetch_all(&state.db.pool)
    .await?;
    Ok(rows)
}

/// Pending-брони с прошедшим дедлайном (для фонового обработчика).
pub async fn expired_pending(
    state: &Arc<AppState>,
    now: DateTime<Utc>,
) -> Result<Vec<Booking>, BookingError> {
    let rows: Vec<Booking> = sqlx::query_as(
        "SELECT * FROM bookings WHERE status = 'pending' AND expires_at < $1",
    )
    .bind(now)
    .fetch_all(&state.db.pool)
    .await?;
    Ok(rows)
}

enum NotifyKind {
    Confirmed,
    Cancelled,
}

// Уведомление владельцу брони отправляется в фоне уже после коммита:
// его сбой не должен откатывать или задерживать ответ клиенту.
fn notify_owner(state: Arc<AppState>, booking: Booking, kind: NotifyKind) {
    tokio::spawn(async move {
        let user = match User::find_by_id(booking.user_id, &state.db).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                warn!(booking_id = %booking.id, "Failed to load booking owner: {e}");
                return;
            }
        };
        let event_name: String =
            match sqlx::query_scalar("SELECT name FROM events WHERE id = $1")
                .bind(booking.event_id)
                .fetch_optional(&state.db.pool)
                .await
            {
                Ok(name) => name.unwrap_or_default(),
                Err(e) => {
                    warn!(booking_id = %booking.id, "Failed to load event name: {e}");
                    return;
                }
            };
        match kind {
            NotifyKind::Confirmed => {
                state
                    .notifier
                    .booking_confirmed(&user, &booking, &event_name)
                    .await
            }
            NotifyKind::Cancelled => {
                state
                    .notifier
                    .booking_cancelled(&user, &booking, &event_name)
                    .await
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_guard_accepts_pending_before_deadline() {
        let now = Utc::now();
        assert!(confirm_guard(BookingStatus::Pending, now + Duration::minutes(5), now).is_ok());
    }

    #[test]
    fn confirm_guard_rejects_expired_with_distinct_error() {
        let now = Utc::now();
        let err =
            confirm_guard(BookingStatus::Pending, now - Duration::seconds(1), now).unwrap_err();
        assert!(matches!(err, BookingError::Expired));
        assert_eq!(err.status_code(), StatusCode::GONE);
    }

    #[test]
    fn confirm_guard_rejects_terminal_states() {
        let now = Utc::now();
        let later = now + Duration::minutes(5);
        assert!(matches!(
            confirm_guard(BookingStatus::Confirmed, later, now),
            Err(BookingError::NotPending)
        ));
        assert!(matches!(
            confirm_guard(BookingStatus::Cancelled, later, now),
            Err(BookingError::NotPending)
        ));
    }

    #[test]
    fn confirm_guard_allows_exactly_at_deadline() {
        let now = Utc::now();
        assert!(confirm_guard(BookingStatus::Pending, now, now).is_ok());
    }

    #[test]
    fn cancel_guard_rejects_repeat_cancellation() {
        let err = cancel_guard(BookingStatus::Cancelled).unwrap_err();
        assert!(matches!(err, BookingError::AlreadyCancelled));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn cancel_guard_allows_pending_and_confirmed() {
        assert!(cancel_guard(BookingStatus::Pending).is_ok());
        assert!(cancel_guard(BookingStatus::Confirmed).is_ok());
    }

    #[test]
    fn error_status_codes_match_contract() {
        assert_eq!(BookingError::EventNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BookingError::BookingNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BookingError::NoSeatsAvailable.status_code(), StatusCode::CONFLICT);
        assert_eq!(BookingError::AlreadyCancelled.status_code(), StatusCode::CONFLICT);
        assert_eq!(BookingError::NotPending.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BookingError::Expired.status_code(), StatusCode::GONE);
    }

    #[test]
    fn error_messages_are_client_facing_text() {
        assert_eq!(BookingError::NoSeatsAvailable.to_string(), "No seats available");
        assert_eq!(BookingError::Expired.to_string(), "Booking has expired");
    }
}
