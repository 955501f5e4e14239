//! Text-generation capability trait definition.

use botforge_types::error::GenerateError;
use botforge_types::generate::GeneratorAvailability;

/// Port for the opaque text-generation capability.
///
/// Given a persona-prefixed prompt and a length bound, produces one
/// generated continuation. The capability is a shared, stateless
/// dependency -- agents invoke it but do not own it.
///
/// Implementations live in botforge-infra (e.g., `CompletionGenerator`).
pub trait TextGenerator: Send + Sync {
    /// Explicit availability state, surfaced through `/health`.
    fn availability(&self) -> GeneratorAvailability;

    /// Generate a continuation of `prompt`, bounded by `max_length` tokens.
    fn generate(
        &self,
        prompt: &str,
        max_length: u32,
    ) -> impl std::future::Future<Output = Result<String, GenerateError>> + Send;
}
