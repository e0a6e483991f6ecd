use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::Message;

/// Identity of the connected bot account.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: i64,
    pub name: String,
    pub username: String,
}

/// Options for an outgoing message.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub markdown: bool,
    pub disable_link_preview: bool,
    /// Platform message id to thread the reply onto.
    pub reply_to: Option<i64>,
}

/// One round of update polling.
#[derive(Debug, Clone, Default)]
pub struct Polled {
    /// Offset to pass to the next poll, absent when nothing arrived.
    pub next_offset: Option<i64>,
    pub messages: Vec<Message>,
}

/// Transport trait - abstraction for the chat platform adapter.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the identity of the bot account.
    async fn identity(&self) -> Result<BotIdentity, BotError>;

    /// Wait for new messages, long-polling up to `timeout_secs`.
    async fn poll(&self, offset: i64, timeout_secs: i64) -> Result<Polled, BotError>;

    /// Send a message to a chat and return the platform message id.
    async fn send(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<i64, BotError>;
}
