//! Bot wiring: command handlers, the update loop, reply deduplication in
//! group chats and the easter eggs.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::{Dispatch, HandlerRegistry, Reply};
use crate::application::services::{book, events};
use crate::domain::entities::{Content, Message};
use crate::domain::traits::{SendOptions, Transport};
use crate::infrastructure::cache::{Atomic, TtlCache};
use crate::infrastructure::config::Config;
use crate::infrastructure::resources::Resources;
use crate::infrastructure::timezone::Gmt;

const POLL_TIMEOUT_SECS: i64 = 30;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);
/// How long a reply stays eligible for the "see the last answer" shortcut.
const PREVIOUS_REPLY_TTL: Duration = Duration::from_secs(600);

static FIND_RUBY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bruby\b").expect("valid pattern"));
static FIND_JAVA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bjava\b").expect("valid pattern"));
static FIND_PYTHON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpython\b").expect("valid pattern"));

/// Builds the command registry with every handler the bot answers to.
pub fn build_registry(
    config: &Arc<Config>,
    resources: &Arc<Resources>,
    tz: &'static Gmt,
) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    {
        let config = Arc::clone(config);
        registry.add(&["/start"], move |message: &Message| {
            tracing::info!(from = message.sender_name(), "/start");
            Ok(Reply::plain(format!(
                "Olá! Eu sou o bot para {}! Se precisar de ajuda: /help",
                config.community.groups.join(", ")
            )))
        });
    }

    {
        let config = Arc::clone(config);
        // the help text never changes, compose it once on first use
        let help_cache: Arc<Atomic<String>> = Arc::new(Atomic::new());
        registry.add(&["/help", "/ajuda"], move |message: &Message| {
            tracing::info!(from = message.sender_name(), "/help");
            let help = help_cache.get_or_init(|| compose_help(&config.community.groups));
            Ok(Reply::plain(help))
        });
    }

    registry.add(&["/about"], |message: &Message| {
        tracing::info!(from = message.sender_name(), "/about");
        Ok(Reply::plain(
            "Esse bot obtém informações de eventos do Meetup. \
             Para saber mais ou contribuir: https://github.com/gdgaju/ajubot",
        ))
    });

    {
        let resources = Arc::clone(resources);
        registry.add(&["/links"], move |message: &Message| {
            tracing::info!(from = message.sender_name(), "/links");
            let response = match resources.get_social_links() {
                Some(links) if !links.is_empty() => {
                    let mut text =
                        String::from("*Esses são os links para o nosso grupo:*\n\n");
                    for (kind, url) in links {
                        text.push_str(&format!("🔗 {}: {}\n", capitalize(&kind), url));
                    }
                    text
                }
                _ => "Não existem links associados a esse grupo.".to_string(),
            };
            Ok(Reply::markdown(response).reusable())
        });
    }

    {
        let config = Arc::clone(config);
        let resources = Arc::clone(resources);
        registry.add(&["/events", "/eventos"], move |message: &Message| {
            tracing::info!(from = message.sender_name(), "/events");
            let next_events = resources
                .get_events(5)
                .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
            let response = if next_events.is_empty() {
                format!(
                    "Não há nenhum futuro evento do grupo {}.",
                    config.community.groups.join(", ")
                )
            } else {
                events::format_events(&next_events)
            };
            Ok(Reply::markdown(response).reusable())
        });
    }

    {
        let resources = Arc::clone(resources);
        registry.add(&["/book", "/livro"], move |message: &Message| {
            tracing::info!(from = message.sender_name(), "/book");
            // Two attempts: an expired promotion means the memoized page is
            // stale, so invalidate and refetch once.
            let mut response = None;
            for _ in 0..2 {
                let free_book = resources
                    .get_free_book()
                    .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
                if let Some(text) = book::book_response(free_book.as_ref(), tz.now()) {
                    response = Some(text);
                    break;
                }
                resources.invalidate_book();
            }
            let text = response
                .unwrap_or_else(|| "O livro de hoje ainda não está disponível".to_string());
            Ok(Reply::markdown(text).reusable())
        });
    }

    registry
}

fn compose_help(groups: &[String]) -> String {
    let mut help = String::from(
        "/help - Exibe essa mensagem.\n\
         /about - Sobre o bot e como contribuir.\n\
         /book - Informa o ebook gratuito do dia na Packt Publishing.\n",
    );
    if groups.len() > 1 {
        help.push_str(&format!(
            "/events - Informa a lista de próximos eventos dos grupos: {}.",
            groups.join(", ")
        ));
    } else {
        help.push_str(&format!(
            "/events - Informa a lista de próximos eventos do {}.",
            groups.join(", ")
        ));
    }
    help
}

/// Joke replies for messages mentioning certain languages. First match wins,
/// one reply at most.
fn easter_egg(text: &str, username: &str) -> Option<String> {
    if FIND_RUBY.is_match(text) {
        Some(format!("{} ama Ruby <3", username))
    } else if FIND_JAVA.is_match(text) {
        Some("Ihh... acabou a RAM".to_string())
    } else if FIND_PYTHON.is_match(text) {
        Some("import antigravity".to_string())
    } else {
        None
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
struct PreviousReply {
    text: String,
    message_id: i64,
}

/// The community bot: polls the transport and routes messages through the
/// handler registry.
pub struct AjuBot<T: Transport> {
    config: Arc<Config>,
    transport: T,
    registry: Arc<HandlerRegistry>,
    previous: TtlCache<(String, i64), PreviousReply>,
}

impl<T: Transport> AjuBot<T> {
    pub fn new(config: Arc<Config>, transport: T, registry: HandlerRegistry) -> Self {
        Self {
            config,
            transport,
            registry: Arc::new(registry),
            previous: TtlCache::new(PREVIOUS_REPLY_TTL),
        }
    }

    /// Runs the update loop. Only returns on a startup failure; polling
    /// errors are logged and retried.
    pub async fn run(&self) -> Result<(), BotError> {
        let identity = self.transport.identity().await?;
        tracing::info!(username = %identity.username, "bot started");
        tracing::info!(groups = %self.config.community.groups.join(", "), "serving community");
        if self.config.bot.dev {
            tracing::info!("dev mode enabled");
            tracing::info!(token = ?self.config.telegram.token, "telegram credentials");
            tracing::info!(meetup_key = ?self.config.events.meetup_key, "meetup credentials");
        }

        let mut offset = 0i64;
        loop {
            match self.transport.poll(offset, POLL_TIMEOUT_SECS).await {
                Ok(polled) => {
                    for message in &polled.messages {
                        if let Err(error) = self.handle_message(message).await {
                            tracing::error!(error = %error, "failed to process message");
                        }
                    }
                    if let Some(next) = polled.next_offset {
                        offset = next;
                    }
                }
                Err(error) => {
                    tracing::error!(error = %error, "failed to fetch updates");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    /// Routes one inbound message: commands through the registry, plain text
    /// through the easter eggs.
    pub async fn handle_message(&self, message: &Message) -> Result<(), BotError> {
        match &message.content {
            Content::Command { name, .. } => {
                let registry = Arc::clone(&self.registry);
                let command = name.clone();
                let owned = message.clone();
                // Handlers do blocking fetches, keep them off the async loop.
                let dispatch =
                    tokio::task::spawn_blocking(move || registry.dispatch(&command, &owned))
                        .await
                        .map_err(|e| BotError::Internal(e.to_string()))?;
                if let Dispatch::Replied(reply) = dispatch {
                    self.deliver(message, name, reply).await?;
                }
                Ok(())
            }
            Content::Text(text) => {
                if let Some(joke) = easter_egg(text, message.sender_name()) {
                    self.transport
                        .send(message.chat.id, &joke, SendOptions::default())
                        .await?;
                }
                Ok(())
            }
        }
    }

    /// Sends a reply, deduplicating repeats in group chats: when a reply
    /// marked reusable recently produced the same text, point at the previous
    /// answer instead of repeating it. Other replies always go out in full.
    async fn deliver(&self, message: &Message, command: &str, reply: Reply) -> Result<(), BotError> {
        let options = SendOptions {
            markdown: reply.markdown,
            disable_link_preview: !reply.link_preview,
            reply_to: message.origin_id,
        };

        if !reply.reuse || !message.chat.kind.is_group() {
            self.transport
                .send(message.chat.id, &reply.text, options)
                .await?;
            return Ok(());
        }

        let key = (command.to_string(), message.chat.id);
        if let Some(previous) = self.previous.get(&key) {
            if previous.text == reply.text {
                self.transport
                    .send(
                        message.chat.id,
                        "Clique para ver a última resposta",
                        SendOptions {
                            reply_to: Some(previous.message_id),
                            ..SendOptions::default()
                        },
                    )
                    .await?;
                return Ok(());
            }
        }

        let sent = self
            .transport
            .send(message.chat.id, &reply.text, options)
            .await?;
        self.previous.insert(
            key,
            PreviousReply {
                text: reply.text,
                message_id: sent,
            },
        );
        Ok(())
    }
}
