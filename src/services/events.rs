//! events.rs
//!
//! Операции над мероприятиями. Отмена мероприятия каскадно отменяет все
//! живые брони и возвращает пул мест к полному размеру одной транзакцией;
//! уведомления затронутым пользователям уходят в фоне после коммита.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{Event, EventStatus, User};
use crate::AppState;
use std::sync::Arc;

/// Минимальный срок до начала, после которого отмена уже не принимается.
const MIN_CANCEL_NOTICE_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event not found")]
    NotFound,
    #[error("Event is already cancelled")]
    AlreadyCancelled,
    #[error("Cannot cancel an event that already took place")]
    PastEvent,
    #[error("Cancellation is too close to the event date")]
    TooLate,
    #[error("invalid booking_ttl")]
    InvalidTtl,
    #[error("Database error")]
    Db(#[from] sqlx::Error),
}

impl EventError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventError::NotFound => StatusCode::NOT_FOUND,
            EventError::AlreadyCancelled => StatusCode::CONFLICT,
            EventError::PastEvent | EventError::TooLate | EventError::InvalidTtl => {
                StatusCode::BAD_REQUEST
            }
            EventError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        if let EventError::Db(e) = &self {
            error!("event sql error: {e:?}");
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Можно ли отменить мероприятие.
pub(crate) fn cancel_guard(event: &Event, now: DateTime<Utc>) -> Result<(), EventError> {
    if event.is_cancelled() {
        return Err(EventError::AlreadyCancelled);
    }
    if event.date < now {
        return Err(EventError::PastEvent);
    }
    if event.date - now < Duration::hours(MIN_CANCEL_NOTICE_HOURS) {
        return Err(EventError::TooLate);
    }
    Ok(())
}

/// Создать мероприятие: пул мест стартует полным, статус active.
/// Бизнес-валидации дат и размера пула намеренно нет - клиент показывает
/// ответ сервера как есть, а сервер принимает все, что парсится.
pub async fn create_event(
    state: &Arc<AppState>,
    name: String,
    date: DateTime<Utc>,
    total_seats: i32,
    booking_ttl_secs: i64,
    requires_payment: bool,
) -> Result<Event, EventError> {
    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4(),
        name,
        date,
        total_seats,
        available: total_seats,
        booking_ttl_secs,
        requires_payment,
        status: EventStatus::Active,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO events
            (id, name, date, total_seats, available, booking_ttl_secs,
             requires_payment, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(event.id)
    .bind(&event.name)
    .bind(event.date)
    .bind(event.total_seats)
    .bind(event.available)
    .bind(event.booking_ttl_secs)
    .bind(event.requires_payment)
    .bind(event.status)
    .bind(event.created_at)
    .bind(event.updated_at)
    .execute(&state.db.pool)
    .await?;

    info!(event_id = %event.id, name = %event.name, "Event created");
    Ok(event)
}

pub async fn get_event(state: &Arc<AppState>, id: Uuid) -> Result<Event, EventError> {
    Event::find_by_id(id, &state.db)
        .await?
        .ok_or(EventError::NotFound)
}

pub async fn list_events(state: &Arc<AppState>) -> Result<Vec<Event>, EventError> {
    let events: Vec<Event> = sqlx::query_as("SELECT * FROM events ORDER BY date")
        .fetch_all(&state.db.pool)
        .await?;
    Ok(events)
}

/// Отменить мероприятие: все живые брони становятся cancelled, пул мест
/// возвращается к total_seats, статус - cancelled. Атомарно.
pub async fn cancel_event(
    state: &Arc<AppState>,
    event_id: Uuid,
    reason: String,
) -> Result<(), EventError> {
    let mut tx = state.db.pool.begin().await?;

    let event: Event = sqlx::query_as("SELECT * FROM events WHERE id = $1 FOR UPDATE")
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(EventError::NotFound)?;

    cancel_guard(&event, Utc::now())?;

    let affected_users: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE bookings
        SET status = 'cancelled'
        WHERE event_id = $1 AND status <> 'cancelled'
        RETURNING user_id
        "#,
    )
    .bind(event_id)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE events
        SET status = 'cancelled', available = total_seats, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(event_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        event_id = %event_id,
        event_name = %event.name,
        cancelled_bookings = affected_users.len(),
        reason = %reason,
        "Event cancelled"
    );

    notify_affected(
        state.clone(),
        event.name,
        reason,
        affected_users.into_iter().map(|(id,)| id).collect(),
    );
    Ok(())
}

// Рассылка после коммита: каждому пользователю с аннулированной бронью.
fn notify_affected(state: Arc<AppState>, event_name: String, reason: String, user_ids: Vec<Uuid>) {
    if user_ids.is_empty() {
        return;
    }
    tokio::spawn(async move {
        let mut sent = 0usize;
        for user_id in &user_ids {
            match User::find_by_id(*user_id, &state.db).await {
                Ok(Some(user)) => {
                    state.notifier.event_cancelled(&user, &event_name, &reason).await;
                    sent += 1;
                }
                Ok(None) => {}
                Err(e) => warn!(user_id = %user_id, "Failed to load user for notification: {e}"),
            }
        }
        info!(
            event_name = %event_name,
            sent,
            total = user_ids.len(),
            "Event cancellation notifications dispatched"
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event_on(date: DateTime<Utc>, status: EventStatus) -> Event {
        Event {
            id: Uuid::nil(),
            name: "Test".to_string(),
            date,
            total_seats: 10,
            available: 10,
            booking_ttl_secs: 1800,
            requires_payment: false,
            status,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn cancel_guard_accepts_future_event_with_notice() {
        let now = Utc::now();
        let e = event_on(now + Duration::days(3), EventStatus::Active);
        assert!(cancel_guard(&e, now).is_ok());
    }

    #[test]
    fn cancel_guard_rejects_already_cancelled() {
        let now = Utc::now();
        let e = event_on(now + Duration::days(3), EventStatus::Cancelled);
        assert!(matches!(cancel_guard(&e, now), Err(EventError::AlreadyCancelled)));
    }

    #[test]
    fn cancel_guard_rejects_past_event() {
        let now = Utc::now();
        let e = event_on(now - Duration::hours(1), EventStatus::Active);
        assert!(matches!(cancel_guard(&e, now), Err(EventError::PastEvent)));
    }

    #[test]
    fn cancel_guard_rejects_less_than_a_day_of_notice() {
        let now = Utc::now();
        let e = event_on(now + Duration::hours(23), EventStatus::Active);
        assert!(matches!(cancel_guard(&e, now), Err(EventError::TooLate)));
    }

    #[test]
    fn error_status_codes_match_contract() {
        assert_eq!(EventError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(EventError::AlreadyCancelled.status_code(), StatusCode::CONFLICT);
        assert_eq!(EventError::PastEvent.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(EventError::TooLate.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(EventError::InvalidTtl.status_code(), StatusCode::BAD_REQUEST);
    }
}
