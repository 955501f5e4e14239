//! Completion client behind the `TextGenerator` port.
//!
//! Talks to an OpenAI-compatible completions endpoint
//! (`POST {base}/v1/completions`). When no endpoint is configured the
//! generator reports `Unavailable` and agents fall back to the fixed
//! degraded-mode reply -- the service still runs without any model.
//!
//! The API key (when the endpoint requires one) is wrapped in
//! [`secrecy::SecretString`] and only exposed when building the
//! Authorization header; it never appears in Debug output or logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use botforge_core::port::TextGenerator;
use botforge_types::config::ServerConfig;
use botforge_types::error::GenerateError;
use botforge_types::generate::GeneratorAvailability;

/// Upper bound on one generation call. Bounds how long an agent's turn
/// lock can be held by a wedged model server.
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

struct Endpoint {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

/// Text generator backed by an OpenAI-compatible completions endpoint.
pub struct CompletionGenerator {
    endpoint: Option<Endpoint>,
}

impl CompletionGenerator {
    /// Build from server config. `generation_url = None` yields a
    /// generator that is permanently [`GeneratorAvailability::Unavailable`].
    pub fn from_config(config: &ServerConfig) -> Self {
        let endpoint = config.generation_url.as_ref().map(|url| {
            let client = reqwest::Client::builder()
                .timeout(GENERATION_TIMEOUT)
                .build()
                .expect("failed to create reqwest client");

            Endpoint {
                client,
                base_url: url.trim_end_matches('/').to_string(),
                model: config.model.clone(),
                api_key: config
                    .generation_api_key
                    .as_ref()
                    .map(|key| SecretString::from(key.clone())),
            }
        });

        Self { endpoint }
    }

    /// A generator with no endpoint, for deployments without a model.
    pub fn unavailable() -> Self {
        Self { endpoint: None }
    }
}

impl TextGenerator for CompletionGenerator {
    fn availability(&self) -> GeneratorAvailability {
        match self.endpoint {
            Some(_) => GeneratorAvailability::Ready,
            None => GeneratorAvailability::Unavailable,
        }
    }

    async fn generate(&self, prompt: &str, max_length: u32) -> Result<String, GenerateError> {
        let endpoint = self.endpoint.as_ref().ok_or(GenerateError::Unavailable)?;

        let body = CompletionRequest {
            model: &endpoint.model,
            prompt,
            max_tokens: max_length,
            n: 1,
        };

        let mut request = endpoint
            .client
            .post(format!("{}/v1/completions", endpoint.base_url))
            .json(&body);
        if let Some(key) = &endpoint.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Request(format!(
                "generation endpoint returned {status}"
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::BadResponse(e.to_string()))?;

        // First continuation only, mirroring n=1 in the request.
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| GenerateError::BadResponse("empty choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_generator_is_unavailable() {
        let generator = CompletionGenerator::unavailable();
        assert_eq!(
            generator.availability(),
            GeneratorAvailability::Unavailable
        );
    }

    #[tokio::test]
    async fn test_unconfigured_generate_fails_fast() {
        let generator = CompletionGenerator::unavailable();
        let err = generator.generate("prompt", 64).await.unwrap_err();
        assert!(matches!(err, GenerateError::Unavailable));
    }

    #[test]
    fn test_configured_generator_is_ready() {
        let config = ServerConfig {
            generation_url: Some("http://localhost:8001/".to_string()),
            ..ServerConfig::default()
        };
        let generator = CompletionGenerator::from_config(&config);
        assert_eq!(generator.availability(), GeneratorAvailability::Ready);
    }

    #[test]
    fn test_completion_request_wire_format() {
        let body = CompletionRequest {
            model: "distilgpt2",
            prompt: "You are terse.\nUser: hi\nAssistant:",
            max_tokens: 64,
            n: 1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "distilgpt2");
        assert_eq!(json["max_tokens"], 64);
        assert_eq!(json["n"], 1);
    }
}
