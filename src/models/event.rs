use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Cancelled,
}

// Поля сериализуются под именами, которые читает клиент (ID, TotalSeats, BookingTTL...)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub total_seats: i32,
    pub available: i32,
    #[serde(rename = "BookingTTL", with = "crate::duration::ttl_string")]
    pub booking_ttl_secs: i64,
    pub requires_payment: bool,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    // Найти мероприятие по id
    pub async fn find_by_id(
        id: Uuid,
        db: &crate::database::Database,
    ) -> Result<Option<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&db.pool)
            .await
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Event {
        Event {
            id: Uuid::nil(),
            name: "Rust Meetup".to_string(),
            date: Utc.with_ymd_and_hms(2026, 10, 1, 18, 0, 0).unwrap(),
            total_seats: 100,
            available: 40,
            booking_ttl_secs: 1800,
            requires_payment: false,
            status: EventStatus::Active,
            created_at: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn serializes_with_client_facing_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("ID").is_some());
        assert_eq!(json["Name"], "Rust Meetup");
        assert_eq!(json["TotalSeats"], 100);
        assert_eq!(json["Available"], 40);
        assert_eq!(json["BookingTTL"], "30m0s");
        assert_eq!(json["RequiresPayment"], false);
        assert_eq!(json["Status"], "active");
    }

    #[test]
    fn ttl_string_round_trips() {
        let json = serde_json::to_string(&sample()).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back.booking_ttl_secs, 1800);
    }
}
