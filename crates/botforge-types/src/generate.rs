//! Generation-capability status types.
//!
//! Availability is an explicit state surfaced through `/health` rather
//! than something inferred from a null binding.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Whether the text-generation capability can currently serve requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorAvailability {
    /// A generation endpoint is configured and the client initialized.
    Ready,
    /// No endpoint configured or the client failed to initialize. Chat
    /// still succeeds in degraded mode with a fixed fallback reply.
    Unavailable,
}

impl fmt::Display for GeneratorAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorAvailability::Ready => write!(f, "ready"),
            GeneratorAvailability::Unavailable => write!(f, "unavailable"),
        }
    }
}
