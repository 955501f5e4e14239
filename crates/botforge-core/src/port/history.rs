//! Local persistence trait definition.

use botforge_types::bot::{BotConfig, HistoryEntry};
use botforge_types::error::HistoryError;

/// Port for per-bot local persistence: one config blob and one history
/// blob per bot, keyed by bot name.
///
/// Implementations live in botforge-infra (e.g., `JsonFileStore`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait HistoryStore: Send + Sync {
    /// Overwrite the stored history for a bot with a point-in-time snapshot.
    fn save_history(
        &self,
        name: &str,
        history: &[HistoryEntry],
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;

    /// Load the stored history for a bot.
    ///
    /// Returns an empty sequence when no blob exists. A blob that exists
    /// but cannot be parsed is `HistoryError::Corrupt` -- callers must not
    /// treat it as empty.
    fn load_history(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<HistoryEntry>, HistoryError>> + Send;

    /// Persist a bot's config blob locally.
    fn save_config(
        &self,
        config: &BotConfig,
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;

    /// Load a bot's config blob, if one is cached locally.
    fn load_config(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<BotConfig>, HistoryError>> + Send;
}
