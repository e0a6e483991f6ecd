//! Handler registry - maps command names to handlers and dispatches them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::Message;

/// A reply produced by a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
    pub link_preview: bool,
    /// In group chats a recent identical reply is referenced instead of resent.
    pub reuse: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            link_preview: true,
            reuse: false,
        }
    }

    /// Markdown reply with link previews suppressed.
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
            link_preview: false,
            reuse: false,
        }
    }

    /// Marks the reply as eligible for the group-chat repeat shortcut.
    pub fn reusable(mut self) -> Self {
        self.reuse = true;
        self
    }
}

/// Command handler function type.
pub type Handler = Arc<dyn Fn(&Message) -> Result<Reply, CommandError> + Send + Sync>;

/// Outcome of dispatching a command name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Handler ran and produced a reply.
    Replied(Reply),
    /// Handler ran and failed; the error was logged.
    Failed,
    /// No handler is registered under this name.
    NotFound,
}

impl Dispatch {
    /// Whether the command was found and attempted, regardless of success.
    pub fn was_handled(&self) -> bool {
        !matches!(self, Dispatch::NotFound)
    }
}

/// Registry mapping command names to handlers.
///
/// A handler may be registered under several names (aliases). Registering an
/// existing name replaces the previous handler, last write wins.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under every name in `names`.
    pub fn add<F>(&mut self, names: &[&str], handler: F)
    where
        F: Fn(&Message) -> Result<Reply, CommandError> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        for name in names {
            let previous = self
                .handlers
                .insert((*name).to_string(), Arc::clone(&handler));
            if previous.is_some() {
                tracing::debug!(command = *name, "handler replaced");
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Looks up `name` and runs its handler.
    ///
    /// A handler failure is logged at error level and swallowed; the command
    /// still counts as handled. An unknown name produces no side effect.
    pub fn dispatch(&self, name: &str, message: &Message) -> Dispatch {
        let Some(handler) = self.handlers.get(name) else {
            return Dispatch::NotFound;
        };
        match handler(message) {
            Ok(reply) => Dispatch::Replied(reply),
            Err(error) => {
                tracing::error!(command = name, error = %error, "command handler failed");
                Dispatch::Failed
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch), but a handler failure propagates to
    /// the caller instead of being logged. `Ok(None)` means the name is not
    /// registered.
    pub fn try_dispatch(
        &self,
        name: &str,
        message: &Message,
    ) -> Result<Option<Reply>, CommandError> {
        match self.handlers.get(name) {
            Some(handler) => handler(message).map(Some),
            None => Ok(None),
        }
    }
}
