use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Booking {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "EventID")]
    pub event_id: Uuid,
    #[serde(rename = "UserID")]
    pub user_id: Uuid,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Booking {
    // Найти бронь по id
    pub async fn find_by_id(
        id: Uuid,
        db: &crate::database::Database,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }

    /// Истекла ли бронь: ожидает подтверждения, но дедлайн уже прошел.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Pending && self.expires_at < now
    }
}

/// Строка админского списка броней: имя мероприятия и email денормализованы,
/// `expires_at` присутствует только пока бронь ожидает подтверждения.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingView {
    pub id: Uuid,
    pub event_name: String,
    pub user_email: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending(expires_at: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::nil(),
            event_id: Uuid::nil(),
            user_id: Uuid::nil(),
            status: BookingStatus::Pending,
            created_at: expires_at - Duration::minutes(30),
            expires_at,
            confirmed_at: None,
        }
    }

    #[test]
    fn pending_booking_past_deadline_is_expired() {
        let now = Utc::now();
        assert!(pending(now - Duration::seconds(1)).is_expired(now));
        assert!(!pending(now + Duration::minutes(5)).is_expired(now));
    }

    #[test]
    fn terminal_statuses_never_report_expired() {
        let now = Utc::now();
        let mut b = pending(now - Duration::hours(1));
        b.status = BookingStatus::Confirmed;
        assert!(!b.is_expired(now));
        b.status = BookingStatus::Cancelled;
        assert!(!b.is_expired(now));
    }

    #[test]
    fn serializes_with_client_facing_field_names() {
        let now = Utc::now();
        let json = serde_json::to_value(pending(now)).unwrap();
        assert!(json.get("ID").is_some());
        assert!(json.get("EventID").is_some());
        assert!(json.get("UserID").is_some());
        assert_eq!(json["Status"], "pending");
    }
}
