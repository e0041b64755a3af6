//! Message shapes crossing the chat boundary in both directions.

pub mod command;
pub mod message;
pub mod reply;
