//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Cache: in-memory lazy cell and TTL memoization
//! - Timezone: shared fixed-offset timezone handles
//! - Config: configuration loading
//! - Resources: remote content fetching
//! - Adapters: platform integration (Telegram)

pub mod adapters;
pub mod cache;
pub mod config;
pub mod resources;
pub mod timezone;
