//! Server configuration for Botforge.
//!
//! `ServerConfig` is loaded from an optional `config.toml` under the data
//! directory; every field has a sensible default and the important ones
//! can be overridden via environment variables, so a bare `bforge serve`
//! works out of the box.

use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

/// Top-level configuration for the Botforge service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the memory server (remote blob store).
    #[serde(default = "default_memory_url")]
    pub memory_url: String,

    /// Base URL of an OpenAI-compatible completions endpoint. When unset,
    /// bots run in degraded mode and reply with the fallback string.
    #[serde(default)]
    pub generation_url: Option<String>,

    /// Model name passed to the generation endpoint.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key for the generation endpoint, if it requires one.
    #[serde(default, skip_serializing)]
    pub generation_api_key: Option<String>,

    /// Host the REST API binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the REST API binds to.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_memory_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_model() -> String {
    "distilgpt2".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            memory_url: default_memory_url(),
            generation_url: None,
            model: default_model(),
            generation_api_key: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `{data_dir}/config.toml` if it exists,
    /// then apply environment overrides.
    ///
    /// Overrides: `BOTFORGE_MEMORY_URL`, `BOTFORGE_GENERATION_URL`,
    /// `BOTFORGE_GENERATION_API_KEY`, `BOTFORGE_MODEL`.
    pub fn load(data_dir: &Path) -> Result<Self, toml::de::Error> {
        let path = data_dir.join("config.toml");
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(_) => Self::default(),
        };

        if let Ok(url) = std::env::var("BOTFORGE_MEMORY_URL") {
            config.memory_url = url;
        }
        if let Ok(url) = std::env::var("BOTFORGE_GENERATION_URL") {
            config.generation_url = Some(url);
        }
        if let Ok(key) = std::env::var("BOTFORGE_GENERATION_API_KEY") {
            config.generation_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("BOTFORGE_MODEL") {
            config.model = model;
        }

        Ok(config)
    }
}

/// Resolve the data directory holding bot configs, histories, and
/// `config.toml`.
///
/// Priority:
/// 1. `BOTFORGE_DATA_DIR` environment variable
/// 2. Platform home directory: `~/.botforge`
/// 3. Last resort: `./.botforge`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BOTFORGE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".botforge");
    }

    PathBuf::from(".botforge")
}
