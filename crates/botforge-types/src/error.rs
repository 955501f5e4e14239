use thiserror::Error;

/// Errors related to bot registry and agent operations.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("invalid bot name: {0}")]
    InvalidName(String),

    #[error("message required")]
    InvalidMessage,

    #[error("invalid bot config: {0}")]
    InvalidConfig(String),

    #[error("bot '{0}' already exists")]
    AlreadyExists(String),

    #[error("bot not deployed")]
    NotFound,

    #[error("bot config not found in memory: {detail}")]
    ConfigNotFound { name: String, detail: String },

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Errors from the local JSON-file persistence layer.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The blob exists but cannot be parsed. Surfaced, never silently
    /// treated as an empty history.
    #[error("history for '{name}' is corrupt: {detail}")]
    Corrupt { name: String, detail: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the remote memory-server client's load path.
///
/// `NotFound` and `Unreachable` are distinct so `deploy` can report an
/// accurate failure message, even though both end up as a single
/// `BotError::ConfigNotFound` toward the end caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("memory returned {status} for '{key}'")]
    NotFound { key: String, status: u16 },

    #[error("memory unreachable: {detail}")]
    Unreachable { detail: String },
}

/// Errors from the text-generation capability.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no generation endpoint configured")]
    Unavailable,

    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation returned no usable text: {0}")]
    BadResponse(String),
}
