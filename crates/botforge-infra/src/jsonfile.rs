//! JSON-file implementation of the `HistoryStore` port.
//!
//! One blob per bot under the data directory: `{name}.bot.json` for the
//! config object and `{name}.history.json` for the entry array. Writes go
//! through a temp file plus rename, which keeps the previous snapshot
//! intact if the process dies mid-write (best-effort, not fsync-hardened).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use botforge_core::port::HistoryStore;
use botforge_types::bot::{BotConfig, HistoryEntry};
use botforge_types::error::HistoryError;

/// Local filesystem persistence for bot configs and histories.
///
/// All operations go through `tokio::fs` for async I/O.
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `data_dir`. The directory is created on
    /// first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a bot's config blob: `{data_dir}/{name}.bot.json`.
    pub fn config_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.bot.json"))
    }

    /// Path of a bot's history blob: `{data_dir}/{name}.history.json`.
    pub fn history_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.history.json"))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), std::io::Error> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let tmp = path.with_extension(format!("tmp.{}", uuid::Uuid::now_v7()));
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, path).await
    }
}

impl HistoryStore for JsonFileStore {
    async fn save_history(
        &self,
        name: &str,
        history: &[HistoryEntry],
    ) -> Result<(), HistoryError> {
        let blob = serde_json::to_vec_pretty(history).map_err(|e| HistoryError::Corrupt {
            name: name.to_string(),
            detail: e.to_string(),
        })?;
        self.write_atomic(&self.history_path(name), &blob).await?;
        Ok(())
    }

    async fn load_history(&self, name: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let contents = match tokio::fs::read(self.history_path(name)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&contents).map_err(|e| HistoryError::Corrupt {
            name: name.to_string(),
            detail: e.to_string(),
        })
    }

    async fn save_config(&self, config: &BotConfig) -> Result<(), HistoryError> {
        let blob = serde_json::to_vec_pretty(config).map_err(|e| HistoryError::Corrupt {
            name: config.name.clone(),
            detail: e.to_string(),
        })?;
        self.write_atomic(&self.config_path(&config.name), &blob)
            .await?;
        Ok(())
    }

    async fn load_config(&self, name: &str) -> Result<Option<BotConfig>, HistoryError> {
        let contents = match tokio::fs::read(self.config_path(name)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&contents)
            .map(Some)
            .map_err(|e| HistoryError::Corrupt {
                name: name.to_string(),
                detail: e.to_string(),
            })
    }
}
