use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Identity and generation parameters for one bot.
///
/// `name` is the unique registry key and is immutable after creation.
/// `persona` is prepended to every prompt sent to the generator; changing
/// it means recreating the bot. Serialized as `{name}.bot.json` both
/// locally and on the memory server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    /// Prompt prefix steering the bot's tone and behavior.
    #[serde(default = "default_persona")]
    pub persona: String,
    /// Upper bound on generated-text length, in tokens.
    #[serde(default = "default_max_length")]
    pub max_length: u32,
}

fn default_persona() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_max_length() -> u32 {
    128
}

/// Which side of the conversation produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "bot" => Ok(Role::Bot),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// One turn of a bot's conversation.
///
/// Entries form an append-only ordered sequence; the index is the turn
/// order. Serialized as a JSON array of `{role, text}` objects in
/// `{name}.history.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

/// Request to create a new bot. Only `name` is required -- persona and
/// max_length get the same defaults the config itself carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBotRequest {
    pub name: String,
    #[serde(default = "default_persona")]
    pub persona: String,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
}

/// Request to deploy a bot from the memory server by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployBotRequest {
    pub name: String,
}

/// Request body for one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}
