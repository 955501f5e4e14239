//! Bot agent: one bot's config, conversation history, and generator binding.
//!
//! A `BotAgent` serializes all chat turns for its bot behind a single
//! async mutex. Slow generation for one bot therefore never blocks other
//! bots, but one bot processes at most one chat at a time -- intentional
//! backpressure inherited from the deployment model.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use botforge_types::bot::{BotConfig, HistoryEntry};
use botforge_types::generate::GeneratorAvailability;

use crate::port::TextGenerator;

/// Fixed reply returned when the generation capability is unavailable or
/// fails mid-call. A degraded-mode success, not an error.
pub const FALLBACK_REPLY: &str = "Model not available.";

/// Result of one chat turn: the reply plus a point-in-time history
/// snapshot taken under the agent lock, for persistence after the lock
/// is released.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub reply: String,
    pub history: Vec<HistoryEntry>,
}

/// A live bot instance.
///
/// Owns its config and history; holds a shared binding to the generation
/// capability. Constructed only by the registry, which guarantees at most
/// one instance per name.
#[derive(Debug)]
pub struct BotAgent<G: TextGenerator> {
    config: BotConfig,
    history: Mutex<Vec<HistoryEntry>>,
    generator: Arc<G>,
}

impl<G: TextGenerator> BotAgent<G> {
    /// Create an agent seeded with previously persisted history.
    pub fn new(config: BotConfig, history: Vec<HistoryEntry>, generator: Arc<G>) -> Self {
        Self {
            config,
            history: Mutex::new(history),
            generator,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Run one chat turn.
    ///
    /// The whole turn -- user append, generation, bot append -- happens
    /// under the agent mutex, so concurrent calls for the same bot cannot
    /// interleave their history entries. Generator failures degrade to
    /// [`FALLBACK_REPLY`]; this method never fails.
    pub async fn chat(&self, prompt: &str) -> ChatTurn {
        let mut history = self.history.lock().await;
        history.push(HistoryEntry::user(prompt));

        let reply = match self.generator.availability() {
            GeneratorAvailability::Unavailable => {
                debug!(bot = %self.config.name, "generator unavailable, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
            GeneratorAvailability::Ready => {
                let full_prompt = format!(
                    "{}\nUser: {}\nAssistant:",
                    self.config.persona, prompt
                );
                match self
                    .generator
                    .generate(&full_prompt, self.config.max_length)
                    .await
                {
                    Ok(text) => text.trim().to_string(),
                    Err(e) => {
                        warn!(bot = %self.config.name, error = %e, "generation failed, using fallback reply");
                        FALLBACK_REPLY.to_string()
                    }
                }
            }
        };

        history.push(HistoryEntry::bot(reply.clone()));

        ChatTurn {
            reply,
            history: history.clone(),
        }
    }

    /// Snapshot of the current history.
    ///
    /// Returns a copy; the live sequence is never exposed outside the
    /// agent lock. Never fails.
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use botforge_types::bot::Role;
    use botforge_types::error::GenerateError;

    struct CannedGenerator {
        reply: String,
    }

    impl TextGenerator for CannedGenerator {
        fn availability(&self) -> GeneratorAvailability {
            GeneratorAvailability::Ready
        }

        async fn generate(&self, _prompt: &str, _max_length: u32) -> Result<String, GenerateError> {
            Ok(self.reply.clone())
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

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn availability(&self) -> GeneratorAvailability {
            GeneratorAvailability::Ready
        }

        async fn generate(&self, _prompt: &str, _max_length: u32) -> Result<String, GenerateError> {
            Err(GenerateError::Request("boom".to_string()))
        }
    }

    fn config(name: &str) -> BotConfig {
        BotConfig {
            name: name.to_string(),
            persona: "You are terse.".to_string(),
            max_length: 64,
        }
    }

    #[tokio::test]
    async fn test_chat_appends_user_then_bot_entry() {
        let agent = BotAgent::new(
            config("helper"),
            Vec::new(),
            Arc::new(CannedGenerator {
                reply: "  hello there  ".to_string(),
            }),
        );

        let turn = agent.chat("hi").await;
        assert_eq!(turn.reply, "hello there");

        let history = agent.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], HistoryEntry::user("hi"));
        assert_eq!(history[1], HistoryEntry::bot("hello there"));
    }

    #[tokio::test]
    async fn test_offline_generator_degrades_to_fallback() {
        let agent = BotAgent::new(config("helper"), Vec::new(), Arc::new(OfflineGenerator));

        let turn = agent.chat("hi").await;
        assert_eq!(turn.reply, FALLBACK_REPLY);

        let history = agent.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], HistoryEntry::bot(FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_fallback() {
        let agent = BotAgent::new(config("helper"), Vec::new(), Arc::new(FailingGenerator));

        let turn = agent.chat("hi").await;
        assert_eq!(turn.reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_sequential_chats_produce_2n_entries_in_order() {
        let agent = BotAgent::new(
            config("helper"),
            Vec::new(),
            Arc::new(CannedGenerator {
                reply: "ok".to_string(),
            }),
        );

        for i in 0..5 {
            agent.chat(&format!("msg {i}")).await;
        }

        let history = agent.history().await;
        assert_eq!(history.len(), 10);
        for i in 0..5 {
            assert_eq!(history[2 * i].text, format!("msg {i}"));
            assert_eq!(history[2 * i].role, Role::User);
            assert_eq!(history[2 * i + 1].role, Role::Bot);
        }
    }

    #[tokio::test]
    async fn test_concurrent_chats_never_interleave() {
        let agent = Arc::new(BotAgent::new(
            config("helper"),
            Vec::new(),
            Arc::new(CannedGenerator {
                reply: "ok".to_string(),
            }),
        ));

        let mut handles = Vec::new();
        for i in 0..16 {
            let agent = Arc::clone(&agent);
            handles.push(tokio::spawn(async move {
                agent.chat(&format!("msg {i}")).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = agent.history().await;
        assert_eq!(history.len(), 32);
        // Each user entry must be immediately followed by its bot entry.
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Bot);
        }
    }

    #[tokio::test]
    async fn test_seeded_history_is_preserved() {
        let seed = vec![HistoryEntry::user("old"), HistoryEntry::bot("reply")];
        let agent = BotAgent::new(
            config("helper"),
            seed.clone(),
            Arc::new(CannedGenerator {
                reply: "ok".to_string(),
            }),
        );

        agent.chat("new").await;
        let history = agent.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(&history[..2], &seed[..]);
    }
}
