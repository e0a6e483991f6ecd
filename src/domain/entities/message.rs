use chrono::{DateTime, Utc};

use super::User;

/// Kind of chat a message arrived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    Other(String),
}

impl ChatKind {
    pub fn from_api(kind: &str) -> Self {
        match kind {
            "private" => ChatKind::Private,
            "group" => ChatKind::Group,
            "supergroup" => ChatKind::Supergroup,
            "channel" => ChatKind::Channel,
            other => ChatKind::Other(other.to_string()),
        }
    }

    /// Group and supergroup chats share replies, so responses are deduplicated there.
    pub fn is_group(&self) -> bool {
        matches!(self, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// Chat a message belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
    pub kind: ChatKind,
}

/// Message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Content::Command { .. })
    }
}

/// An incoming chat message.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    /// Message id assigned by the chat platform, used for reply threading.
    pub origin_id: Option<i64>,
    pub chat: Chat,
    pub sender: Option<User>,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(chat: Chat, content: Content) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            origin_id: None,
            chat,
            sender: None,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn from_text(chat_id: i64, kind: ChatKind, text: impl Into<String>) -> Self {
        Self::new(Chat { id: chat_id, kind }, Content::Text(text.into()))
    }

    pub fn from_command(
        chat_id: i64,
        kind: ChatKind,
        name: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self::new(
            Chat { id: chat_id, kind },
            Content::Command {
                name: name.into(),
                args,
            },
        )
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }

    pub fn with_origin_id(mut self, origin_id: i64) -> Self {
        self.origin_id = Some(origin_id);
        self
    }

    /// Sender name for logging.
    pub fn sender_name(&self) -> &str {
        self.sender
            .as_ref()
            .map(User::display_name)
            .unwrap_or("unknown")
    }
}
