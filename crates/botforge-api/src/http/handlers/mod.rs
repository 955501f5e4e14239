//! REST API handlers.

pub mod bot;
pub mod chat;
