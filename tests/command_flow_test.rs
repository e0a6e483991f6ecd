//! End-to-end message handling tests with a mock transport.
//! Run with: cargo test --test command_flow_test

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;

use ajubot::application::errors::BotError;
use ajubot::application::messaging::{parser, HandlerRegistry, Reply};
use ajubot::bot::AjuBot;
use ajubot::domain::entities::{Chat, ChatKind, Message};
use ajubot::domain::traits::{BotIdentity, Polled, SendOptions, Transport};
use ajubot::infrastructure::config::Config;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SentMessage {
    chat_id: i64,
    text: String,
    reply_to: Option<i64>,
}

#[derive(Clone, Default)]
struct MockTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl MockTransport {
    fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn identity(&self) -> Result<BotIdentity, BotError> {
        Ok(BotIdentity {
            id: 1,
            name: "Aju".to_string(),
            username: "AjuBot".to_string(),
        })
    }

    async fn poll(&self, _offset: i64, _timeout_secs: i64) -> Result<Polled, BotError> {
        Ok(Polled::default())
    }

    async fn send(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<i64, BotError> {
        let mut sent = self.sent.lock().expect("mock lock poisoned");
        let message_id = 100 + sent.len() as i64;
        sent.push(SentMessage {
            chat_id,
            text: text.to_string(),
            reply_to: options.reply_to,
        });
        Ok(message_id)
    }
}

fn test_config() -> Arc<Config> {
    let mut config = Config::default();
    config.telegram.token = Some("123:abc".to_string());
    config.community.groups = vec!["GDG-Aracaju".to_string()];
    Arc::new(config)
}

fn inbound(chat_id: i64, kind: ChatKind, text: &str, origin_id: i64) -> Message {
    Message::new(Chat { id: chat_id, kind }, parser::parse_content(text))
        .with_origin_id(origin_id)
}

fn bot_with_echo_handler(transport: MockTransport) -> AjuBot<MockTransport> {
    let mut registry = HandlerRegistry::new();
    registry.add(&["/eco", "/echo"], |_message: &Message| {
        Ok(Reply::plain("sempre a mesma resposta").reusable())
    });
    AjuBot::new(test_config(), transport, registry)
}

#[tokio::test]
async fn command_with_mention_reaches_handler() {
    ensure_init();
    let transport = MockTransport::default();
    let bot = bot_with_echo_handler(transport.clone());

    let message = inbound(10, ChatKind::Private, "/eco@AjuBot agora", 1);
    bot.handle_message(&message).await.expect("handled");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "sempre a mesma resposta");
    assert_eq!(sent[0].chat_id, 10);
    assert_eq!(sent[0].reply_to, Some(1));
}

#[tokio::test]
async fn aliases_behave_identically() {
    ensure_init();
    let transport = MockTransport::default();
    let bot = bot_with_echo_handler(transport.clone());

    bot.handle_message(&inbound(10, ChatKind::Private, "/eco", 1))
        .await
        .expect("handled");
    bot.handle_message(&inbound(10, ChatKind::Private, "/echo", 2))
        .await
        .expect("handled");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, sent[1].text);
}

#[tokio::test]
async fn unknown_command_sends_nothing() {
    ensure_init();
    let transport = MockTransport::default();
    let bot = bot_with_echo_handler(transport.clone());

    bot.handle_message(&inbound(10, ChatKind::Private, "/nada", 1))
        .await
        .expect("handled");

    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn group_repeat_points_at_previous_answer() {
    ensure_init();
    let transport = MockTransport::default();
    let bot = bot_with_echo_handler(transport.clone());

    bot.handle_message(&inbound(-50, ChatKind::Supergroup, "/eco", 1))
        .await
        .expect("handled");
    bot.handle_message(&inbound(-50, ChatKind::Supergroup, "/eco", 2))
        .await
        .expect("handled");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, "sempre a mesma resposta");
    assert_eq!(sent[1].text, "Clique para ver a última resposta");
    // threads onto the first answer, message id 100 in the mock
    assert_eq!(sent[1].reply_to, Some(100));
}

#[tokio::test]
async fn plain_command_group_repeat_is_sent_in_full() {
    ensure_init();
    let transport = MockTransport::default();
    let mut registry = HandlerRegistry::new();
    registry.add(&["/oi"], |_message: &Message| {
        Ok(Reply::plain("Olá! Eu sou o bot!"))
    });
    let bot = AjuBot::new(test_config(), transport.clone(), registry);

    bot.handle_message(&inbound(-50, ChatKind::Supergroup, "/oi", 1))
        .await
        .expect("handled");
    bot.handle_message(&inbound(-50, ChatKind::Supergroup, "/oi", 2))
        .await
        .expect("handled");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, sent[1].text);
    assert_eq!(sent[1].reply_to, Some(2));
}

#[tokio::test]
async fn private_repeat_is_sent_in_full() {
    ensure_init();
    let transport = MockTransport::default();
    let bot = bot_with_echo_handler(transport.clone());

    bot.handle_message(&inbound(10, ChatKind::Private, "/eco", 1))
        .await
        .expect("handled");
    bot.handle_message(&inbound(10, ChatKind::Private, "/eco", 2))
        .await
        .expect("handled");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].text, sent[1].text);
}

#[tokio::test]
async fn failing_handler_sends_nothing_and_does_not_crash() {
    ensure_init();
    let transport = MockTransport::default();
    let mut registry = HandlerRegistry::new();
    registry.add(&["/quebra"], |_message: &Message| {
        Err(ajubot::application::errors::CommandError::ExecutionFailed(
            "boom".to_string(),
        ))
    });
    let bot = AjuBot::new(test_config(), transport.clone(), registry);

    bot.handle_message(&inbound(10, ChatKind::Private, "/quebra", 1))
        .await
        .expect("failure is swallowed");

    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn plain_text_triggers_easter_egg() {
    ensure_init();
    let transport = MockTransport::default();
    let bot = bot_with_echo_handler(transport.clone());

    let message = inbound(10, ChatKind::Private, "escrevo java no trabalho", 1);
    bot.handle_message(&message).await.expect("handled");

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "Ihh... acabou a RAM");
}
