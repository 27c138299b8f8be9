//! notify.rs
//!
//! Уведомления пользователям о судьбе их брони: email по SMTP и сообщение
//! через Telegram Bot API. Оба канала опциональны и включаются конфигом;
//! сбой доставки логируется и никогда не влияет на результат операции.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, SmtpConfig, TelegramConfig};
use crate::models::{Booking, User};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Email(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("telegram request failed: {0}")]
    Telegram(#[from] reqwest::Error),
    #[error("telegram responded with status {0}")]
    TelegramStatus(reqwest::StatusCode),
}

/// Email-канал поверх асинхронного SMTP-транспорта lettre.
#[derive(Clone)]
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
}

impl EmailNotifier {
    pub fn from_config(cfg: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.user.clone(), cfg.password.clone()))
            .build();
        Ok(Self {
            transport,
            from_email: cfg.from_email.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from_email.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Telegram-канал: POST sendMessage в Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn from_config(cfg: &TelegramConfig) -> Self {
        Self::with_base_url("https://api.telegram.org", &cfg.bot_token, &cfg.chat_id)
    }

    pub fn with_base_url(base_url: &str, bot_token: &str, chat_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let resp = self
            .client
            .post(&url)
            .json(&json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(NotifyError::TelegramStatus(resp.status()));
        }
        Ok(())
    }
}

/// Композитный отправитель: рассылает во все сконфигурированные каналы.
#[derive(Clone, Default)]
pub struct Notifier {
    email: Option<EmailNotifier>,
    telegram: Option<TelegramNotifier>,
}

impl Notifier {
    pub fn from_config(config: &Config) -> Self {
        let email = match &config.smtp {
            Some(smtp) => match EmailNotifier::from_config(smtp) {
                Ok(n) => Some(n),
                Err(e) => {
                    warn!("SMTP notifier disabled: {e}");
                    None
                }
            },
            None => None,
        };
        let telegram = config.telegram.as_ref().map(TelegramNotifier::from_config);
        if email.is_none() && telegram.is_none() {
            info!("No notification channels configured");
        }
        Self { email, telegram }
    }

    pub async fn booking_confirmed(&self, user: &User, booking: &Booking, event_name: &str) {
        let text = format!(
            "Ваша бронь {} на «{}» подтверждена.",
            booking.id, event_name
        );
        self.dispatch(user, "Бронь подтверждена", &text).await;
    }

    pub async fn booking_cancelled(&self, user: &User, booking: &Booking, event_name: &str) {
        let text = format!(
            "Ваша бронь {} на «{}» отменена.",
            booking.id, event_name
        );
        self.dispatch(user, "Бронь отменена", &text).await;
    }

    pub async fn event_cancelled(&self, user: &User, event_name: &str, reason: &str) {
        let text = if reason.is_empty() {
            format!("Мероприятие «{event_name}» отменено, ваша бронь аннулирована.")
        } else {
            format!("Мероприятие «{event_name}» отменено ({reason}), ваша бронь аннулирована.")
        };
        self.dispatch(user, "Мероприятие отменено", &text).await;
    }

    async fn dispatch(&self, user: &User, subject: &str, text: &str) {
        if let Some(email) = &self.email {
            if let Err(e) = email.send(&user.email, subject, text).await {
                warn!(user_id = %user.id, "Failed to send email notification: {e}");
            }
        }
        if let Some(telegram) = &self.telegram {
            if let Err(e) = telegram.send(text).await {
                warn!(user_id = %user.id, "Failed to send telegram notification: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn telegram_send_posts_to_bot_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "42",
                "text": "проверка"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::with_base_url(&server.uri(), "123:abc", "42");
        notifier.send("проверка").await.unwrap();
    }

    #[tokio::test]
    async fn telegram_non_2xx_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::with_base_url(&server.uri(), "123:abc", "42");
        let err = notifier.send("проверка").await.unwrap_err();
        assert!(matches!(err, NotifyError::TelegramStatus(s) if s.as_u16() == 403));
    }
}
