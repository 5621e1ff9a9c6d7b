use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::bot::FareBot;
use crate::config::AppConfig;
use crate::domain::UserId;
use crate::notifier::{Message, NotifierHub, TelegramNotifier};
use crate::utils::mask_token;

/// Identity used for commands typed on stdin.
pub const CONSOLE_USER: UserId = 0;

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Feeds incoming messages to the bot and delivers its replies.
pub struct FareWatch {
    config: AppConfig,
    bot: Arc<FareBot>,
    notifier: Arc<NotifierHub>,
    telegram: Option<TelegramNotifier>,
}

impl FareWatch {
    pub fn new(
        config: AppConfig,
        bot: FareBot,
        notifier: NotifierHub,
        telegram: Option<TelegramNotifier>,
    ) -> Self {
        Self {
            config,
            bot: Arc::new(bot),
            notifier: Arc::new(notifier),
            telegram,
        }
    }

    pub async fn run(&self) -> Result<()> {
        info!(
            "💵 Default price threshold: ${:.2}",
            self.bot.thresholds().default_threshold()
        );
        match &self.telegram {
            Some(telegram) => self.run_telegram(telegram).await,
            None => self.run_console().await,
        }
    }

    /// Long-polls Telegram forever. Each message is handled on its own task so
    /// a slow month scan for one user never blocks another user.
    async fn run_telegram(&self, telegram: &TelegramNotifier) -> Result<()> {
        if let Some(token) = &self.config.telegram_bot_token {
            info!("🤖 Telegram bot {} polling for commands...", mask_token(token));
        }

        let mut offset = 0;
        loop {
            match self.poll_once(telegram, offset).await {
                Ok((next, _handlers)) => offset = next,
                Err(e) => {
                    warn!("⚠️  Telegram polling failed: {:#}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    /// Fetches one batch of updates from `offset` and dispatches every text
    /// message. Returns the offset for the next poll (past the highest
    /// `update_id` seen) and the spawned reply tasks.
    async fn poll_once(
        &self,
        telegram: &TelegramNotifier,
        offset: i64,
    ) -> Result<(i64, Vec<JoinHandle<()>>)> {
        let updates = telegram
            .get_updates(offset, self.config.telegram_poll_timeout)
            .await?;

        let mut next = offset;
        let mut handlers = Vec::new();
        for update in updates {
            next = next.max(update.update_id + 1);
            if let Some(handler) = update.message.and_then(|m| self.dispatch(m)) {
                handlers.push(handler);
            }
        }
        Ok((next, handlers))
    }

    /// Spawns the reply task for a text message. Messages without text
    /// (stickers, photos, joins) are ignored. Thresholds belong to the sender,
    /// or to the chat when Telegram omits the sender.
    fn dispatch(&self, message: Message) -> Option<JoinHandle<()>> {
        let text = message.text?;
        let chat_id = message.chat.id;
        let user_id = message.from.as_ref().map_or(chat_id, |user| user.id);
        let username = message
            .from
            .and_then(|user| user.username)
            .unwrap_or_else(|| "Unknown".to_string());
        info!("📩 Message from {} ({}): {}", username, user_id, text);

        let bot = Arc::clone(&self.bot);
        let notifier = Arc::clone(&self.notifier);
        Some(tokio::spawn(async move {
            for reply in bot.handle(user_id, &text).await {
                if let Err(e) = notifier.send(chat_id, &reply).await {
                    error!("Failed to deliver reply to chat {}: {:#}", chat_id, e);
                    break;
                }
            }
        }))
    }

    /// Reads commands from stdin, one per line, until EOF.
    async fn run_console(&self) -> Result<()> {
        info!("⌨️  No Telegram token - reading commands from stdin (try /help)");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            for reply in self.bot.handle(CONSOLE_USER, &line).await {
                self.notifier.send(CONSOLE_USER, &reply).await?;
            }
        }

        info!("👋 stdin closed, shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::FareWatch;
    use crate::bot::FareBot;
    use crate::config::AppConfig;
    use crate::notifier::{ConsoleNotifier, NotifierHub, TelegramNotifier};
    use crate::source::DemoFlightSource;
    use crate::threshold::ThresholdStore;

    fn app(telegram: &TelegramNotifier) -> FareWatch {
        let bot = FareBot::new(Arc::new(DemoFlightSource), ThresholdStore::new(300.0), 1);
        let notifier = NotifierHub::new(ConsoleNotifier::new(), Some(telegram.clone()));
        FareWatch::new(AppConfig::default(), bot, notifier, Some(telegram.clone()))
    }

    #[tokio::test]
    async fn poll_dispatches_text_messages_and_advances_offset() {
        let mut server = Server::new_async().await;
        let updates = server
            .mock("POST", "/botTOKEN/getUpdates")
            .match_body(Matcher::PartialJson(json!({ "offset": 0 })))
            .with_status(200)
            .with_body(
                json!({
                    "ok": true,
                    "result": [
                        {
                            "update_id": 5,
                            "message": {
                                "chat": { "id": 100 },
                                "from": { "id": 11, "username": "ana" },
                                "text": "/threshold"
                            }
                        },
                        {
                            "update_id": 6,
                            "message": {
                                "chat": { "id": 200 },
                                "from": { "id": 22 }
                            }
                        },
                        {
                            "update_id": 7,
                            "message": {
                                "chat": { "id": 300 },
                                "text": "/setthreshold 150"
                            }
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let to_sender = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": 100,
                "text": "Your price alert threshold is $300.00."
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .expect(1)
            .create_async()
            .await;
        let to_silent_chat = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::PartialJson(json!({ "chat_id": 200 })))
            .expect(0)
            .create_async()
            .await;
        let to_anonymous = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::PartialJson(json!({
                "chat_id": 300,
                "text": "Your price alert threshold has been updated to $150.00."
            })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .expect(1)
            .create_async()
            .await;

        let telegram = TelegramNotifier::with_api_base("TOKEN".to_string(), server.url());
        let app = app(&telegram);

        let (next, handlers) = app.poll_once(&telegram, 0).await.unwrap();
        assert_eq!(next, 8);
        assert_eq!(handlers.len(), 2);
        for handler in handlers {
            handler.await.unwrap();
        }

        updates.assert_async().await;
        to_sender.assert_async().await;
        to_silent_chat.assert_async().await;
        to_anonymous.assert_async().await;

        // No sender: the threshold is stored under the chat id.
        assert_eq!(app.bot.thresholds().get(300), 150.0);
        assert_eq!(app.bot.thresholds().get(11), 300.0);
    }

    #[tokio::test]
    async fn empty_poll_keeps_offset() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/botTOKEN/getUpdates")
            .with_status(200)
            .with_body(r#"{"ok":true,"result":[]}"#)
            .create_async()
            .await;

        let telegram = TelegramNotifier::with_api_base("TOKEN".to_string(), server.url());
        let app = app(&telegram);

        let (next, handlers) = app.poll_once(&telegram, 42).await.unwrap();
        assert_eq!(next, 42);
        assert!(handlers.is_empty());
    }

    #[tokio::test]
    async fn failed_poll_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/botTOKEN/getUpdates")
            .with_status(200)
            .with_body(r#"{"ok":false,"description":"Unauthorized"}"#)
            .create_async()
            .await;

        let telegram = TelegramNotifier::with_api_base("TOKEN".to_string(), server.url());
        let app = app(&telegram);

        assert!(app.poll_once(&telegram, 3).await.is_err());
    }
}
