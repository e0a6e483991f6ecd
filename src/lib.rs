//! ajubot - Telegram bot for a local developer community.
//!
//! Answers commands, lists upcoming meetup events and announces the daily
//! free-ebook promotion with time-sensitive expiry warnings.

pub mod application;
pub mod bot;
pub mod domain;
pub mod infrastructure;
