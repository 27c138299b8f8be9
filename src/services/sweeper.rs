//! sweeper.rs
//!
//! Фоновый обработчик просроченных броней: переводит pending-брони с
//! прошедшим `expires_at` в cancelled и возвращает места в пул. Это
//! единственный владелец перехода pending -> expired -> cancelled.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::services::bookings;
use crate::AppState;

pub struct Sweeper {
    state: Arc<AppState>,
}

impl Sweeper {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Бесконечный цикл с интервалом из конфига.
    pub async fn run(self) {
        let interval = Duration::from_secs(self.state.config.scheduler.cleanup_interval_secs);
        info!(interval_secs = interval.as_secs(), "Expiry sweeper started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // первый тик срабатывает сразу
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }

    /// Один проход: ошибка по отдельной брони логируется и не прерывает обход.
    pub async fn sweep(&self) -> usize {
        let expired = match bookings::expired_pending(&self.state, Utc::now()).await {
            Ok(expired) => expired,
            Err(e) => {
                error!("Failed to load expired bookings: {e}");
                return 0;
            }
        };

        if expired.is_empty() {
            return 0;
        }

        info!(count = expired.len(), "Cancelling expired bookings");
        let mut cancelled = 0usize;
        for booking in expired {
            match bookings::cancel_booking(&self.state, booking.id).await {
                Ok(_) => {
                    info!(booking_id = %booking.id, "Expired booking cancelled");
                    cancelled += 1;
                }
                Err(e) => {
                    error!(booking_id = %booking.id, "Failed to cancel expired booking: {e}");
                }
            }
        }
        cancelled
    }
}
