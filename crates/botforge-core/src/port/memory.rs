//! Remote memory-server trait definition.

use botforge_types::error::StoreError;

/// Result of a best-effort upload to the memory server.
///
/// Uploads never raise: transport and server failures are captured here
/// and the caller decides whether to log or ignore them.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub ok: bool,
    /// Response body on success, diagnostic text on failure.
    pub detail: String,
}

impl SaveOutcome {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Port for the remote blob store ("memory server").
///
/// Keys are logical file names such as `{name}.bot.json`. The store may
/// be slow or unreachable; both operations carry a fixed timeout.
pub trait MemoryStore: Send + Sync {
    /// Upload a named blob. Never errors outward.
    fn save(
        &self,
        key: &str,
        blob: Vec<u8>,
    ) -> impl std::future::Future<Output = SaveOutcome> + Send;

    /// Download a named blob.
    ///
    /// `StoreError::NotFound` (the store answered, no such key) and
    /// `StoreError::Unreachable` (transport failure) are distinct so
    /// callers can report which one happened.
    fn load(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, StoreError>> + Send;
}
