//! Services - reply content for the bot commands

pub mod book;
pub mod events;
