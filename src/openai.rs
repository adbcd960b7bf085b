//! OpenAI client configuration with sensible defaults.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for provider API requests (30 seconds).
///
/// A request still in flight past this bound is abandoned and reported as a
/// failure; the caller decides whether that is fatal or degradable.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the LLM provider API key.
pub const LLM_API_KEY_VAR: &str = "LLM_API_KEY";

/// Read the provider API key from the environment, if set and non-empty.
pub fn api_key() -> Option<String> {
    std::env::var(LLM_API_KEY_VAR).ok().filter(|k| !k.is_empty())
}

/// Create a provider client with the configured timeout.
pub fn create_client() -> Client<OpenAIConfig> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a provider client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let config = match api_key() {
        Some(key) => OpenAIConfig::new().with_api_key(key),
        None => OpenAIConfig::default(),
    };

    Client::with_config(config).with_http_client(http_client)
}
