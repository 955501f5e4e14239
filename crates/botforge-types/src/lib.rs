//! Shared domain types for Botforge.
//!
//! This crate contains the core domain types used across the Botforge
//! service: BotConfig, HistoryEntry, server configuration, and the
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, toml, dirs, thiserror.

pub mod bot;
pub mod config;
pub mod error;
pub mod generate;
