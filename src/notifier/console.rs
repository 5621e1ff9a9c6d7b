use anyhow::Result;
use tracing::debug;

use crate::domain::UserId;

#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }

    pub async fn send(&self, chat_id: UserId, text: &str) -> Result<()> {
        println!("{text}\n");
        debug!("Reply printed to console for chat {}", chat_id);
        Ok(())
    }
}
