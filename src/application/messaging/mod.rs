//! Messaging - command extraction and dispatch

pub mod parser;
pub mod registry;

pub use parser::{extract_command, parse_content};
pub use registry::{Dispatch, HandlerRegistry, Reply};
