//! Кодек строкового формата длительности брони ("30m0s", "2h0m0s", "1d").
//!
//! Клиент отправляет и читает TTL как строку из компонентов `число+единица`.
//! На вход принимаются единицы `d`, `h`, `m`, `s`; на выход пишутся только
//! `h`/`m`/`s` (сутки разворачиваются в часы: 86400s -> "24h0m0s").

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,
    #[error("invalid duration: {0}")]
    Invalid(String),
}

/// Разбирает строку вида "1h30m", "30m0s", "1d" в Duration.
pub fn parse(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total_secs: u64 = 0;
    let mut digits = String::new();
    let mut seen_component = false;

    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if digits.is_empty() {
            return Err(DurationParseError::Invalid(input.to_string()));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| DurationParseError::Invalid(input.to_string()))?;
        let unit_secs: u64 = match c {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(DurationParseError::Invalid(input.to_string())),
        };
        total_secs = value
            .checked_mul(unit_secs)
            .and_then(|s| total_secs.checked_add(s))
            .ok_or_else(|| DurationParseError::Invalid(input.to_string()))?;
        digits.clear();
        seen_component = true;
    }

    // хвост из цифр без единицы измерения
    if !digits.is_empty() || !seen_component {
        return Err(DurationParseError::Invalid(input.to_string()));
    }

    Ok(Duration::from_secs(total_secs))
}

/// Форматирует Duration в строку, которую понимает клиент: "30m0s", "2h0m0s".
pub fn format(d: Duration) -> String {
    let total = d.as_secs();
    let h = total / 3_600;
    let m = (total % 3_600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}

/// serde-кодек для полей `booking_ttl_secs: i64`: в JSON поле живет строкой.
pub mod ttl_string {
    use super::{format, parse};
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let d = Duration::from_secs((*secs).max(0) as u64);
        serializer.serialize_str(&format(d))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let d = parse(&s).map_err(de::Error::custom)?;
        Ok(d.as_secs() as i64)
    }
}
