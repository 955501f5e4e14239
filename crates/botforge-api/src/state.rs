//! Application state wiring all collaborators together.
//!
//! AppState holds the bot registry pinned to the concrete infra
//! implementations. The registry itself is generic over its ports; this
//! is the one place the generics are resolved.

use std::path::PathBuf;
use std::sync::Arc;

use botforge_core::registry::BotRegistry;
use botforge_infra::generator::CompletionGenerator;
use botforge_infra::jsonfile::JsonFileStore;
use botforge_infra::memory_client::MemoryClient;
use botforge_types::config::{ServerConfig, resolve_data_dir};

/// Concrete registry type with the generics pinned to infra implementations.
pub type ConcreteRegistry = BotRegistry<JsonFileStore, MemoryClient, CompletionGenerator>;

/// Shared application state used by the REST handlers and CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConcreteRegistry>,
    pub history_store: Arc<JsonFileStore>,
    pub config: ServerConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: resolve the data dir, load
    /// config, wire the registry with its collaborators.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = ServerConfig::load(&data_dir)?;

        let history_store = Arc::new(JsonFileStore::new(data_dir.clone()));
        let memory_store = Arc::new(MemoryClient::new(config.memory_url.clone()));
        let generator = Arc::new(CompletionGenerator::from_config(&config));

        let registry = Arc::new(BotRegistry::new(
            Arc::clone(&history_store),
            memory_store,
            generator,
        ));

        Ok(Self {
            registry,
            history_store,
            config,
            data_dir,
        })
    }
}
