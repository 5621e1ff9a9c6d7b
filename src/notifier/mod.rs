mod chunk;
mod console;
mod telegram;

pub use chunk::{chunk_message, TELEGRAM_MESSAGE_LIMIT};
pub use console::ConsoleNotifier;
pub use telegram::{Message, TelegramNotifier, Update};

use anyhow::Result;
use tracing::{debug, warn};

use crate::domain::UserId;

/// Delivers replies on the active channel. With Telegram configured the reply
/// goes to the chat and is only traced at debug level; failures are logged and
/// do not fail the reply. Without Telegram it is printed to the console.
pub struct NotifierHub {
    console: ConsoleNotifier,
    telegram: Option<TelegramNotifier>,
}

impl NotifierHub {
    pub fn new(console: ConsoleNotifier, telegram: Option<TelegramNotifier>) -> Self {
        Self { console, telegram }
    }

    pub async fn send(&self, chat_id: UserId, text: &str) -> Result<()> {
        let Some(telegram) = &self.telegram else {
            return self.console.send(chat_id, text).await;
        };

        debug!("Reply to chat {}: {}", chat_id, text);
        if let Err(e) = telegram.send(chat_id, text).await {
            warn!("Telegram notification failed: {:#}", e);
        }
        Ok(())
    }
}
