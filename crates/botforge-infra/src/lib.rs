//! Infrastructure layer for Botforge.
//!
//! Contains implementations of the port traits defined in `botforge-core`:
//! JSON-file local persistence, the reqwest memory-server client, and the
//! OpenAI-compatible completion client behind the generator port.

pub mod generator;
pub mod jsonfile;
pub mod memory_client;
