//! Domain layer - Core business objects
//!
//! This layer contains:
//! - Entities: messages, meetup events, the daily free ebook
//! - Traits: the chat transport abstraction

pub mod entities;
pub mod traits;
