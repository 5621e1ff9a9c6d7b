use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::chunk::{chunk_message, TELEGRAM_MESSAGE_LIMIT};
use crate::config::AppConfig;
use crate::domain::UserId;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram Bot API client: sends replies and long-polls for incoming
/// messages.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    bot_token: String,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        Self::with_api_base(bot_token, TELEGRAM_API_BASE)
    }

    pub fn with_api_base(bot_token: String, api_base: impl Into<String>) -> Self {
        Self {
            bot_token,
            api_base: api_base.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn maybe_from_config(config: &AppConfig) -> Option<Self> {
        match &config.telegram_bot_token {
            Some(token) if !token.is_empty() => Some(Self::new(token.clone())),
            _ => None,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    /// Delivers `text` to `chat_id`, split into as many messages as the
    /// Telegram length limit requires. Chunks are sent in order; the first
    /// failure stops delivery.
    pub async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        let chunks = chunk_message(text, TELEGRAM_MESSAGE_LIMIT);
        let total = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            self.send_chunk(chat_id, &chunk)
                .await
                .with_context(|| format!("chunk {}/{} to chat {}", i + 1, total, chat_id))?;
        }
        debug!("Sent {} message(s) to chat {}", total, chat_id);
        Ok(())
    }

    async fn send_chunk(&self, chat_id: i64, text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Failed to send Telegram message: {}", error_text);
            Err(anyhow!("Telegram sendMessage failed: {}", error_text))
        }
    }

    /// Long-polls for new updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64, poll_timeout: Duration) -> Result<Vec<Update>> {
        let payload = serde_json::json!({
            "offset": offset,
            "timeout": poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });

        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(poll_timeout + Duration::from_secs(10))
            .json(&payload)
            .send()
            .await?;

        let body: ApiResponse<Vec<Update>> = response
            .json()
            .await
            .context("failed to decode getUpdates response")?;

        if !body.ok {
            return Err(anyhow!(
                "Telegram getUpdates failed: {}",
                body.description.unwrap_or_else(|| "Unknown error".to_string())
            ));
        }
        let updates = body.result.unwrap_or_default();
        if !updates.is_empty() {
            info!("📨 Received {} update(s) from Telegram", updates.len());
        }
        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::TelegramNotifier;
    use crate::config::AppConfig;

    const TOKEN: &str = "123456:TEST";

    #[test]
    fn enabled_only_with_token() {
        let mut config = AppConfig::default();
        assert!(TelegramNotifier::maybe_from_config(&config).is_none());

        config.telegram_bot_token = Some(String::new());
        assert!(TelegramNotifier::maybe_from_config(&config).is_none());

        config.telegram_bot_token = Some(TOKEN.to_string());
        assert!(TelegramNotifier::maybe_from_config(&config).is_some());
    }

    #[tokio::test]
    async fn sends_plain_text_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123456:TEST/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": 42,
                "text": "No flights found for EZE to BCN on 2024-12-01."
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        let telegram = TelegramNotifier::with_api_base(TOKEN.to_string(), server.url());
        telegram
            .send(42, "No flights found for EZE to BCN on 2024-12-01.")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn long_text_is_sent_in_chunks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123456:TEST/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .expect(3)
            .create_async()
            .await;

        let record = "y".repeat(3000);
        let text = [record.as_str(), record.as_str(), record.as_str()].join("\n\n");

        let telegram = TelegramNotifier::with_api_base(TOKEN.to_string(), server.url());
        telegram.send(42, &text).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_message_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123456:TEST/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let telegram = TelegramNotifier::with_api_base(TOKEN.to_string(), server.url());
        let err = telegram.send(42, "hi").await.unwrap_err();
        assert!(format!("{err:#}").contains("chat not found"));
    }

    #[tokio::test]
    async fn polls_updates() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123456:TEST/getUpdates")
            .match_body(Matcher::PartialJson(json!({ "offset": 7, "timeout": 1 })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ok":true,"result":[
                    {"update_id":7,"message":{"message_id":1,"chat":{"id":42,"type":"private"},
                     "from":{"id":99,"is_bot":false,"first_name":"A","username":"ana"},
                     "text":"/search EZE BCN 2024-12-01"}},
                    {"update_id":8}
                ]}"#,
            )
            .create_async()
            .await;

        let telegram = TelegramNotifier::with_api_base(TOKEN.to_string(), server.url());
        let updates = telegram.get_updates(7, Duration::from_secs(1)).await.unwrap();

        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.from.as_ref().unwrap().id, 99);
        assert_eq!(message.text.as_deref(), Some("/search EZE BCN 2024-12-01"));
        assert!(updates[1].message.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_level_failure_is_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/bot123456:TEST/getUpdates")
            .with_status(401)
            .with_body(r#"{"ok":false,"description":"Unauthorized"}"#)
            .create_async()
            .await;

        let telegram = TelegramNotifier::with_api_base(TOKEN.to_string(), server.url());
        let err = telegram
            .get_updates(0, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unauthorized"));
    }
}
