//! Port trait definitions.
//!
//! These traits define the storage and generation interfaces that the
//! infrastructure layer (botforge-infra) implements. The core crate never
//! depends on any specific HTTP client or filesystem technology.

pub mod generate;
pub mod history;
pub mod memory;

pub use generate::TextGenerator;
pub use history::HistoryStore;
pub use memory::{MemoryStore, SaveOutcome};
