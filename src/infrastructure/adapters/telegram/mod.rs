//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::application::messaging::parser;
use crate::domain::entities::{Chat, ChatKind, Message, User};
use crate::domain::traits::{BotIdentity, Polled, SendOptions, Transport};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: i64,
    allowed_updates: Vec<String>,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disable_web_page_preview: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
}

#[derive(Deserialize)]
struct ApiEnvelope<R> {
    ok: bool,
    result: Option<R>,
    description: Option<String>,
}

/// Telegram bot adapter speaking the HTTP Bot API.
pub struct TelegramAdapter {
    token: String,
    client: Client,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        payload: &impl Serialize,
    ) -> Result<R, BotError> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let envelope: ApiEnvelope<R> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "no description".to_string());
            return Err(BotError::Api(format!("{} failed: {}", method, description)));
        }
        envelope
            .result
            .ok_or_else(|| BotError::Parse(format!("{} returned no result", method)))
    }

    /// Converts a wire message into a domain message, dropping text-less ones.
    fn to_domain(message: &TgMessage) -> Option<Message> {
        let text = message.text.as_deref()?;
        let chat = Chat {
            id: message.chat.id,
            kind: ChatKind::from_api(&message.chat.kind),
        };
        let mut domain = Message::new(chat, parser::parse_content(text))
            .with_origin_id(message.message_id);
        if let Some(from) = &message.from {
            domain = domain.with_sender(User {
                id: from.id,
                username: from.username.clone(),
                first_name: from.first_name.clone(),
            });
        }
        Some(domain)
    }
}

#[async_trait]
impl Transport for TelegramAdapter {
    async fn identity(&self) -> Result<BotIdentity, BotError> {
        #[derive(Deserialize)]
        struct Me {
            id: i64,
            first_name: String,
            username: String,
        }

        let me: Me = self.call("getMe", &serde_json::json!({})).await?;
        Ok(BotIdentity {
            id: me.id,
            name: me.first_name,
            username: me.username,
        })
    }

    async fn poll(&self, offset: i64, timeout_secs: i64) -> Result<Polled, BotError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: vec!["message".to_string()],
        };
        let updates: Vec<Update> = self.call("getUpdates", &request).await?;

        let next_offset = updates.iter().map(|update| update.update_id + 1).max();
        let messages = updates
            .iter()
            .filter_map(|update| update.message.as_ref())
            .filter_map(Self::to_domain)
            .collect();

        Ok(Polled {
            next_offset,
            messages,
        })
    }

    async fn send(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<i64, BotError> {
        #[derive(Deserialize)]
        struct Sent {
            message_id: i64,
        }

        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: options.markdown.then_some("Markdown"),
            disable_web_page_preview: options.disable_link_preview.then_some(true),
            reply_to_message_id: options.reply_to,
        };
        let sent: Sent = self.call("sendMessage", &request).await?;
        Ok(sent.message_id)
    }
}
