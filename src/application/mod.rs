//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Errors: the error taxonomy
//! - Messaging: command extraction and the handler registry
//! - Services: ebook expiry evaluation and event formatting

pub mod errors;
pub mod messaging;
pub mod services;
