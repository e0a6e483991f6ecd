//! Domain entities - plain data types, one struct per shape

pub mod book;
pub mod event;
pub mod message;
pub mod user;

pub use book::FreeBook;
pub use event::Event;
pub use message::{Chat, ChatKind, Content, Message};
pub use user::User;
