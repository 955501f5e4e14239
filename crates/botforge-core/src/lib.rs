//! Bot registry and agent logic for Botforge.
//!
//! This crate defines the "ports" (storage and generation traits) that the
//! infrastructure layer implements, plus the two entities with invariants
//! to protect: [`agent::BotAgent`] (one bot's serialized chat turns) and
//! [`registry::BotRegistry`] (at-most-one live agent per name). It depends
//! only on `botforge-types` -- never on `botforge-infra` or any IO crate.

pub mod agent;
pub mod port;
pub mod registry;
