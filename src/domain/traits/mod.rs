//! Domain traits - abstractions for infrastructure

pub mod transport;

pub use transport::{BotIdentity, Polled, SendOptions, Transport};
