//! Reqwest client for the memory server (remote blob store).
//!
//! Two operations, matching the memory server's wire contract: upload a
//! named blob as a multipart form (`POST /ml/save`, field `name` = logical
//! key, field `file` = blob bytes) and download one by key
//! (`GET /ml/load/{key}`). Every call carries a fixed timeout so a slow
//! store can never block a caller indefinitely.

use std::time::Duration;

use reqwest::multipart::{Form, Part};

use botforge_core::port::{MemoryStore, SaveOutcome};
use botforge_types::error::StoreError;

/// Upper bound on any single memory-server call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the memory server.
pub struct MemoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl MemoryClient {
    /// Create a client for the memory server at `base_url`
    /// (e.g., `http://localhost:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn save_url(&self) -> String {
        format!("{}/ml/save", self.base_url)
    }

    fn load_url(&self, key: &str) -> String {
        format!("{}/ml/load/{key}", self.base_url)
    }
}

impl MemoryStore for MemoryClient {
    async fn save(&self, key: &str, blob: Vec<u8>) -> SaveOutcome {
        let form = Form::new()
            .text("name", key.to_string())
            .part("file", Part::bytes(blob).file_name(key.to_string()));

        let response = match self.client.post(self.save_url()).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(key, error = %e, "memory save transport failure");
                return SaveOutcome::failed(e.to_string());
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            SaveOutcome::ok(body)
        } else {
            SaveOutcome::failed(format!("memory returned {status}: {body}"))
        }
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get(self.load_url(key))
            .send()
            .await
            .map_err(|e| StoreError::Unreachable {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::NotFound {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| StoreError::Unreachable {
            detail: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}
