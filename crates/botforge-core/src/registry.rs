//! Bot registry: name -> live agent, plus the persistence choreography
//! around create, deploy, and chat.
//!
//! Membership lives in a [`DashMap`] so check-and-insert is atomic without
//! a process-wide lock held across I/O: history seeding and the remote
//! config fetch happen before the map is touched, and a lost insert race
//! is resolved by keeping the first agent and discarding the redundant one.
//!
//! Generic over the port traits to keep clean architecture -- botforge-core
//! never depends on botforge-infra.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info, warn};

use botforge_types::bot::{BotConfig, CreateBotRequest, HistoryEntry};
use botforge_types::error::BotError;
use botforge_types::generate::GeneratorAvailability;

use crate::agent::BotAgent;
use crate::port::{HistoryStore, MemoryStore, SaveOutcome, TextGenerator};

/// Memory-server key for a bot's config blob.
pub fn config_key(name: &str) -> String {
    format!("{name}.bot.json")
}

/// Memory-server key for a bot's history blob.
pub fn history_key(name: &str) -> String {
    format!("{name}.history.json")
}

/// Result of a deploy call. Deploying an already-registered name is an
/// idempotent success, not an error.
#[derive(Debug)]
pub enum DeployOutcome<G: TextGenerator> {
    Deployed(Arc<BotAgent<G>>),
    AlreadyDeployed(Arc<BotAgent<G>>),
}

/// Process-wide mapping from bot name to live agent.
///
/// Owns the collection of agents exclusively; each agent owns its own
/// history behind its own lock, so slow generation for one bot never
/// blocks lookups or chats for others.
pub struct BotRegistry<H, M, G>
where
    H: HistoryStore,
    M: MemoryStore,
    G: TextGenerator,
{
    bots: DashMap<String, Arc<BotAgent<G>>>,
    history_store: Arc<H>,
    memory_store: Arc<M>,
    generator: Arc<G>,
}

impl<H, M, G> BotRegistry<H, M, G>
where
    H: HistoryStore,
    M: MemoryStore,
    G: TextGenerator,
{
    /// Create an empty registry with injected collaborators.
    pub fn new(history_store: Arc<H>, memory_store: Arc<M>, generator: Arc<G>) -> Self {
        Self {
            bots: DashMap::new(),
            history_store,
            memory_store,
            generator,
        }
    }

    /// Availability of the shared generation capability, for `/health`.
    pub fn generator_availability(&self) -> GeneratorAvailability {
        self.generator.availability()
    }

    /// Create a new bot and register it under its name.
    ///
    /// Seeds history from local persistence (corrupt blobs are surfaced,
    /// not discarded), persists the config locally, then best-effort
    /// uploads it to the memory server. The upload outcome is returned to
    /// the caller but never rolls back the local creation.
    pub async fn create(
        &self,
        request: CreateBotRequest,
    ) -> Result<(Arc<BotAgent<G>>, SaveOutcome), BotError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(BotError::InvalidName("name required".to_string()));
        }

        if request.max_length == 0 {
            return Err(BotError::InvalidConfig(
                "max_length must be positive".to_string(),
            ));
        }

        if self.bots.contains_key(&name) {
            return Err(BotError::AlreadyExists(name));
        }

        let config = BotConfig {
            name: name.clone(),
            persona: request.persona,
            max_length: request.max_length,
        };

        // Seed before insertion; the authoritative duplicate check is the
        // entry below, so a concurrent create wastes only this load.
        let history = self.history_store.load_history(&name).await?;
        let agent = Arc::new(BotAgent::new(
            config.clone(),
            history,
            Arc::clone(&self.generator),
        ));

        match self.bots.entry(name.clone()) {
            Entry::Occupied(_) => return Err(BotError::AlreadyExists(name)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&agent));
            }
        }
        info!(bot = %name, "bot created");

        if let Err(e) = self.history_store.save_config(&config).await {
            warn!(bot = %name, error = %e, "failed to cache bot config locally");
        }

        let outcome = match serde_json::to_vec_pretty(&config) {
            Ok(blob) => self.memory_store.save(&config_key(&name), blob).await,
            Err(e) => SaveOutcome::failed(format!("config serialization failed: {e}")),
        };
        if !outcome.ok {
            warn!(bot = %name, detail = %outcome.detail, "config upload to memory failed");
        }

        Ok((agent, outcome))
    }

    /// Deploy a bot from its config blob on the memory server.
    ///
    /// Idempotent when the name is already registered. The remote fetch
    /// runs before the membership insert so a slow memory server never
    /// blocks unrelated bots; the rare lost race keeps the first agent.
    pub async fn deploy(&self, name: &str) -> Result<DeployOutcome<G>, BotError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BotError::InvalidName("name required".to_string()));
        }

        if let Some(existing) = self.bots.get(name) {
            return Ok(DeployOutcome::AlreadyDeployed(Arc::clone(&existing)));
        }

        let blob = self
            .memory_store
            .load(&config_key(name))
            .await
            .map_err(|e| BotError::ConfigNotFound {
                name: name.to_string(),
                detail: e.to_string(),
            })?;

        let config: BotConfig =
            serde_json::from_slice(&blob).map_err(|e| BotError::ConfigNotFound {
                name: name.to_string(),
                detail: format!("invalid config blob: {e}"),
            })?;

        let history = self.history_store.load_history(name).await?;
        let agent = Arc::new(BotAgent::new(
            config.clone(),
            history,
            Arc::clone(&self.generator),
        ));

        if let Err(e) = self.history_store.save_config(&config).await {
            warn!(bot = %name, error = %e, "failed to cache bot config locally");
        }

        match self.bots.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                // Lost the insert race; discard the redundant instance.
                debug!(bot = %name, "deploy raced with another registration");
                Ok(DeployOutcome::AlreadyDeployed(Arc::clone(existing.get())))
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&agent));
                info!(bot = %name, "bot deployed from memory");
                Ok(DeployOutcome::Deployed(agent))
            }
        }
    }

    /// Look up a live agent by name.
    pub fn get(&self, name: &str) -> Option<Arc<BotAgent<G>>> {
        self.bots.get(name).map(|agent| Arc::clone(&agent))
    }

    /// Sorted snapshot of registered bot names.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bots.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Run one chat turn against a deployed bot, then persist the history
    /// snapshot locally and best-effort to the memory server.
    ///
    /// Both writes happen after the agent lock is released and after the
    /// reply is committed, so a slow or failed store never delays or fails
    /// the chat itself.
    pub async fn chat(&self, name: &str, message: &str) -> Result<String, BotError> {
        if message.trim().is_empty() {
            return Err(BotError::InvalidMessage);
        }
        let agent = self.get(name).ok_or(BotError::NotFound)?;

        let turn = agent.chat(message).await;

        if let Err(e) = self.history_store.save_history(name, &turn.history).await {
            warn!(bot = %name, error = %e, "failed to persist history locally");
        }

        let outcome = match serde_json::to_vec(&turn.history) {
            Ok(blob) => self.memory_store.save(&history_key(name), blob).await,
            Err(e) => SaveOutcome::failed(format!("history serialization failed: {e}")),
        };
        if !outcome.ok {
            debug!(bot = %name, detail = %outcome.detail, "history push to memory failed");
        }

        Ok(turn.reply)
    }

    /// Snapshot of a deployed bot's history.
    pub async fn history(&self, name: &str) -> Result<Vec<HistoryEntry>, BotError> {
        let agent = self.get(name).ok_or(BotError::NotFound)?;
        Ok(agent.history().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use botforge_types::bot::Role;
    use botforge_types::error::{GenerateError, HistoryError, StoreError};

    use crate::agent::FALLBACK_REPLY;

    #[derive(Default)]
    struct MemHistoryStore {
        histories: Mutex<HashMap<String, Vec<HistoryEntry>>>,
        configs: Mutex<HashMap<String, BotConfig>>,
        corrupt: Mutex<Vec<String>>,
    }

    impl HistoryStore for MemHistoryStore {
        async fn save_history(
            &self,
            name: &str,
            history: &[HistoryEntry],
        ) -> Result<(), HistoryError> {
            self.histories
                .lock()
                .unwrap()
                .insert(name.to_string(), history.to_vec());
            Ok(())
        }

        async fn load_history(&self, name: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
            if self.corrupt.lock().unwrap().iter().any(|n| n == name) {
                return Err(HistoryError::Corrupt {
                    name: name.to_string(),
                    detail: "not json".to_string(),
                });
            }
            Ok(self
                .histories
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .unwrap_or_default())
        }

        async fn save_config(&self, config: &BotConfig) -> Result<(), HistoryError> {
            self.configs
                .lock()
                .unwrap()
                .insert(config.name.clone(), config.clone());
            Ok(())
        }

        async fn load_config(&self, name: &str) -> Result<Option<BotConfig>, HistoryError> {
            Ok(self.configs.lock().unwrap().get(name).cloned())
        }
    }

    #[derive(Default)]
    struct MemMemoryStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
        unreachable: bool,
        saved_keys: Mutex<Vec<String>>,
    }

    impl MemMemoryStore {
        fn unreachable() -> Self {
            Self {
                unreachable: true,
                ..Default::default()
            }
        }

        fn put(&self, key: &str, blob: Vec<u8>) {
            self.blobs.lock().unwrap().insert(key.to_string(), blob);
        }
    }

    impl MemoryStore for MemMemoryStore {
        async fn save(&self, key: &str, blob: Vec<u8>) -> SaveOutcome {
            if self.unreachable {
                return SaveOutcome::failed("memory unreachable: connection refused");
            }
            self.saved_keys.lock().unwrap().push(key.to_string());
            self.blobs.lock().unwrap().insert(key.to_string(), blob);
            SaveOutcome::ok("stored")
        }

        async fn load(&self, key: &str) -> Result<Vec<u8>, StoreError> {
            if self.unreachable {
                return Err(StoreError::Unreachable {
                    detail: "connection refused".to_string(),
                });
            }
            self.blobs
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or(StoreError::NotFound {
                    key: key.to_string(),
                    status: 404,
                })
        }
    }

    #[derive(Debug)]
    struct CannedGenerator;

    impl TextGenerator for CannedGenerator {
        fn availability(&self) -> GeneratorAvailability {
            GeneratorAvailability::Ready
        }

        async fn generate(&self, _prompt: &str, _max_length: u32) -> Result<String, GenerateError> {
            Ok("canned reply".to_string())
        }
    }

    struct OfflineGenerator;

    impl TextGenerator for OfflineGenerator {
        fn availability(&self) -> GeneratorAvailability {
            GeneratorAvailability::Unavailable
        }

        async fn generate(&self, _prompt: &str, _max_length: u32) -> Result<String, GenerateError> {
            Err(GenerateError::Unavailable)
        }
    }

    fn registry() -> BotRegistry<MemHistoryStore, MemMemoryStore, CannedGenerator> {
        BotRegistry::new(
            Arc::new(MemHistoryStore::default()),
            Arc::new(MemMemoryStore::default()),
            Arc::new(CannedGenerator),
        )
    }

    fn create_request(name: &str) -> CreateBotRequest {
        CreateBotRequest {
            name: name.to_string(),
            persona: "You are terse.".to_string(),
            max_length: 64,
        }
    }

    #[tokio::test]
    async fn test_create_registers_and_uploads_config() {
        let memory = Arc::new(MemMemoryStore::default());
        let registry = BotRegistry::new(
            Arc::new(MemHistoryStore::default()),
            Arc::clone(&memory),
            Arc::new(CannedGenerator),
        );

        let (_, outcome) = registry.create(create_request("helper")).await.unwrap();
        assert!(outcome.ok);
        assert_eq!(registry.list(), vec!["helper".to_string()]);
        assert_eq!(
            memory.saved_keys.lock().unwrap().as_slice(),
            &["helper.bot.json".to_string()]
        );
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let registry = registry();
        let err = registry.create(create_request("   ")).await.unwrap_err();
        assert!(matches!(err, BotError::InvalidName(_)));
        assert!(registry.list().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_zero_max_length() {
        let registry = registry();
        let mut request = create_request("helper");
        request.max_length = 0;
        let err = registry.create(request).await.unwrap_err();
        assert!(matches!(err, BotError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_duplicate_create_leaves_first_agent_untouched() {
        let registry = registry();
        let (first, _) = registry.create(create_request("helper")).await.unwrap();
        registry.chat("helper", "hi").await.unwrap();

        let err = registry.create(create_request("helper")).await.unwrap_err();
        assert!(matches!(err, BotError::AlreadyExists(_)));

        let history = registry.history("helper").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(Arc::ptr_eq(&first, &registry.get("helper").unwrap()));
    }

    #[tokio::test]
    async fn test_create_survives_unreachable_memory() {
        let registry = BotRegistry::new(
            Arc::new(MemHistoryStore::default()),
            Arc::new(MemMemoryStore::unreachable()),
            Arc::new(CannedGenerator),
        );

        let (_, outcome) = registry.create(create_request("helper")).await.unwrap();
        assert!(!outcome.ok);
        assert!(registry.get("helper").is_some());
    }

    #[tokio::test]
    async fn test_create_seeds_history_from_local_store() {
        let history_store = Arc::new(MemHistoryStore::default());
        history_store
            .save_history("helper", &[HistoryEntry::user("old"), HistoryEntry::bot("reply")])
            .await
            .unwrap();

        let registry = BotRegistry::new(
            history_store,
            Arc::new(MemMemoryStore::default()),
            Arc::new(CannedGenerator),
        );

        registry.create(create_request("helper")).await.unwrap();
        let history = registry.history("helper").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "old");
    }

    #[tokio::test]
    async fn test_create_surfaces_corrupt_history() {
        let history_store = Arc::new(MemHistoryStore::default());
        history_store
            .corrupt
            .lock()
            .unwrap()
            .push("helper".to_string());

        let registry = BotRegistry::new(
            history_store,
            Arc::new(MemMemoryStore::default()),
            Arc::new(CannedGenerator),
        );

        let err = registry.create(create_request("helper")).await.unwrap_err();
        assert!(matches!(err, BotError::History(HistoryError::Corrupt { .. })));
        assert!(registry.get("helper").is_none());
    }

    #[tokio::test]
    async fn test_deploy_reads_config_from_memory() {
        let memory = Arc::new(MemMemoryStore::default());
        let config = BotConfig {
            name: "helper".to_string(),
            persona: "You are terse.".to_string(),
            max_length: 64,
        };
        memory.put("helper.bot.json", serde_json::to_vec(&config).unwrap());

        let registry = BotRegistry::new(
            Arc::new(MemHistoryStore::default()),
            memory,
            Arc::new(CannedGenerator),
        );

        let outcome = registry.deploy("helper").await.unwrap();
        let agent = match outcome {
            DeployOutcome::Deployed(agent) => agent,
            DeployOutcome::AlreadyDeployed(_) => panic!("expected fresh deploy"),
        };
        assert_eq!(agent.config().persona, "You are terse.");
        assert_eq!(registry.list(), vec!["helper".to_string()]);
    }

    #[tokio::test]
    async fn test_deploy_is_idempotent_for_live_names() {
        let registry = registry();
        let (first, _) = registry.create(create_request("helper")).await.unwrap();
        registry.chat("helper", "hi").await.unwrap();

        let outcome = registry.deploy("helper").await.unwrap();
        match outcome {
            DeployOutcome::AlreadyDeployed(agent) => assert!(Arc::ptr_eq(&agent, &first)),
            DeployOutcome::Deployed(_) => panic!("deploy must not replace a live agent"),
        }
        assert_eq!(registry.history("helper").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deploy_missing_config_reports_not_found() {
        let registry = registry();
        let err = registry.deploy("ghost").await.unwrap_err();
        match err {
            BotError::ConfigNotFound { detail, .. } => assert!(detail.contains("404")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_deploy_unreachable_memory_reports_detail() {
        let registry = BotRegistry::new(
            Arc::new(MemHistoryStore::default()),
            Arc::new(MemMemoryStore::unreachable()),
            Arc::new(CannedGenerator),
        );
        let err = registry.deploy("helper").await.unwrap_err();
        match err {
            BotError::ConfigNotFound { detail, .. } => {
                assert!(detail.contains("unreachable"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_chat_validates_input_and_membership() {
        let registry = registry();
        registry.create(create_request("helper")).await.unwrap();

        assert!(matches!(
            registry.chat("helper", "  ").await.unwrap_err(),
            BotError::InvalidMessage
        ));
        assert!(matches!(
            registry.chat("ghost", "hi").await.unwrap_err(),
            BotError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_chat_persists_history_locally_and_remotely() {
        let history_store = Arc::new(MemHistoryStore::default());
        let memory = Arc::new(MemMemoryStore::default());
        let registry = BotRegistry::new(
            Arc::clone(&history_store),
            Arc::clone(&memory),
            Arc::new(CannedGenerator),
        );

        registry.create(create_request("helper")).await.unwrap();
        let reply = registry.chat("helper", "hi").await.unwrap();
        assert_eq!(reply, "canned reply");

        let stored = history_store.load_history("helper").await.unwrap();
        assert_eq!(stored.len(), 2);

        let keys = memory.saved_keys.lock().unwrap();
        assert!(keys.contains(&"helper.history.json".to_string()));
    }

    #[tokio::test]
    async fn test_scenario_create_chat_offline_then_redeploy() {
        let registry = BotRegistry::new(
            Arc::new(MemHistoryStore::default()),
            Arc::new(MemMemoryStore::default()),
            Arc::new(OfflineGenerator),
        );

        let (_, _) = registry.create(create_request("helper")).await.unwrap();

        let reply = registry.chat("helper", "hi").await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);

        let history = registry.history("helper").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], HistoryEntry::user("hi"));
        assert_eq!(history[1].role, Role::Bot);
        assert_eq!(history[1].text, FALLBACK_REPLY);

        match registry.deploy("helper").await.unwrap() {
            DeployOutcome::AlreadyDeployed(_) => {}
            DeployOutcome::Deployed(_) => panic!("expected idempotent deploy"),
        }
        assert_eq!(registry.list().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_register_exactly_one_agent() {
        let registry = Arc::new(registry());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.create(create_request("helper")).await.is_ok()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(registry.list().len(), 1);
    }
}
