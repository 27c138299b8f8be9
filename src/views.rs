//! Чистые функции представления: проценты занятости, классы бейджей,
//! человекочитаемые длительности. Клиент подставляет их результат в верстку
//! как есть, поэтому строки и пороги здесь являются контрактом.

use chrono::{DateTime, Utc};

use crate::models::BookingStatus;

/// Процент занятости мест: round((total - available) / total * 100).
pub fn occupancy_percent(total_seats: i32, available: i32) -> u32 {
    if total_seats <= 0 {
        return 0;
    }
    let taken = (total_seats - available).clamp(0, total_seats) as f64;
    (taken / total_seats as f64 * 100.0).round() as u32
}

/// Цвет индикатора заполненности: зеленый до 50%, желтый до 80%, дальше красный.
pub fn progress_class(total_seats: i32, available: i32) -> &'static str {
    let percent = occupancy_percent(total_seats, available);
    if percent < 50 {
        "bg-success"
    } else if percent < 80 {
        "bg-warning"
    } else {
        "bg-danger"
    }
}

/// Доступна ли кнопка бронирования.
pub fn can_book(available: i32) -> bool {
    available > 0
}

pub fn booking_status_class(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "bg-success",
        BookingStatus::Pending => "bg-warning",
        BookingStatus::Cancelled => "bg-danger",
    }
}

pub fn booking_status_text(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "Подтверждена",
        BookingStatus::Pending => "Ожидает",
        BookingStatus::Cancelled => "Отменена",
    }
}

/// "30m0s" -> "30 мин", "2h0s" -> "2 ч", "1d0s" -> "1 д".
/// Показывается первый компонент с единицей m/h/d, хвост ("0m0s")
/// отбрасывается; строка без такого компонента возвращается как есть.
pub fn format_ttl(ttl: &str) -> String {
    let mut digits = String::new();
    for c in ttl.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if !digits.is_empty() {
            match c {
                'm' => return format!("{digits} мин"),
                'h' => return format!("{digits} ч"),
                'd' => return format!("{digits} д"),
                _ => digits.clear(),
            }
        }
    }
    ttl.to_string()
}

/// Сколько прошло с момента `then`: "только что", "5 мин назад", ...
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - then).num_seconds().max(0);
    if diff < 60 {
        "только что".to_string()
    } else if diff < 3_600 {
        format!("{} мин назад", diff / 60)
    } else if diff < 86_400 {
        format!("{} ч назад", diff / 3_600)
    } else {
        format!("{} д назад", diff / 86_400)
    }
}

/// Сколько осталось до дедлайна `until`; "Истекло", если он уже позади.
pub fn format_time_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (until - now).num_seconds();
    if diff <= 0 {
        "Истекло".to_string()
    } else if diff < 60 {
        format!("{diff} сек")
    } else if diff < 3_600 {
        format!("{} мин", diff / 60)
    } else if diff < 86_400 {
        format!("{} ч", diff / 3_600)
    } else {
        format!("{} д", diff / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    #[test]
    fn occupancy_percent_matches_rounding_contract() {
        assert_eq!(occupancy_percent(100, 40), 60);
        assert_eq!(occupancy_percent(3, 1), 67);
        assert_eq!(occupancy_percent(100, 100), 0);
        assert_eq!(occupancy_percent(100, 0), 100);
        assert_eq!(occupancy_percent(0, 0), 0);
    }

    #[test]
    fn progress_class_thresholds() {
        assert_eq!(progress_class(100, 60), "bg-success"); // 40%
        assert_eq!(progress_class(100, 51), "bg-success"); // 49%
        assert_eq!(progress_class(100, 50), "bg-warning"); // 50%
        assert_eq!(progress_class(100, 21), "bg-warning"); // 79%
        assert_eq!(progress_class(100, 20), "bg-danger"); // 80%
        assert_eq!(progress_class(100, 0), "bg-danger"); // 100%
    }

    #[test]
    fn booking_disabled_without_seats() {
        assert!(can_book(1));
        assert!(!can_book(0));
    }

    #[test]
    fn ttl_formats_to_russian_units() {
        assert_eq!(format_ttl("30m0s"), "30 мин");
        assert_eq!(format_ttl("2h0s"), "2 ч");
        assert_eq!(format_ttl("1d0s"), "1 д");
    }

    #[test]
    fn ttl_shows_first_component_only() {
        assert_eq!(format_ttl("24h0m0s"), "24 ч");
        assert_eq!(format_ttl("1h30m"), "1 ч");
        assert_eq!(format_ttl("2h0m0s"), "2 ч");
    }

    #[test]
    fn ttl_without_display_unit_passes_through() {
        assert_eq!(format_ttl("90s"), "90s");
        assert_eq!(format_ttl("скоро"), "скоро");
    }

    #[test]
    fn status_badges() {
        assert_eq!(booking_status_class(BookingStatus::Confirmed), "bg-success");
        assert_eq!(booking_status_class(BookingStatus::Pending), "bg-warning");
        assert_eq!(booking_status_class(BookingStatus::Cancelled), "bg-danger");
        assert_eq!(booking_status_text(BookingStatus::Pending), "Ожидает");
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::seconds(10), now), "только что");
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5 мин назад");
        assert_eq!(format_time_ago(now - Duration::hours(3), now), "3 ч назад");
        assert_eq!(format_time_ago(now - Duration::days(2), now), "2 д назад");
    }

    #[test]
    fn expired_deadline_reports_expired() {
        let now = Utc::now();
        assert_eq!(format_time_remaining(now - Duration::seconds(1), now), "Истекло");
        assert_eq!(format_time_remaining(now, now), "Истекло");
        assert_eq!(format_time_remaining(now + Duration::seconds(30), now), "30 сек");
        assert_eq!(format_time_remaining(now + Duration::minutes(15), now), "15 мин");
    }

    proptest! {
        #[test]
        fn occupancy_percent_stays_in_bounds(total in 0i32..10_000, available in 0i32..10_000) {
            let p = occupancy_percent(total, available.min(total));
            prop_assert!(p <= 100);
        }

        #[test]
        fn progress_class_is_total_over_percent(total in 1i32..10_000, available in 0i32..10_000) {
            let available = available.min(total);
            let p = occupancy_percent(total, available);
            let class = progress_class(total, available);
            if p < 50 {
                prop_assert_eq!(class, "bg-success");
            } else if p < 80 {
                prop_assert_eq!(class, "bg-warning");
            } else {
                prop_assert_eq!(class, "bg-danger");
            }
        }
    }
}
