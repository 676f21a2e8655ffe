//! Builds the classifier stack from configuration.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use yolo_config::ClassifierConfig;

use crate::classifier::{LlmIntentClassifier, LlmIntentClassifierConfig, DEFAULT_SYSTEM_PROMPT};
use crate::llm::{HttpLlmClient, HttpLlmClientConfig, LlmClient, LlmError};

/// Errors that can occur when building an LLM client.
#[derive(Debug, Error)]
pub enum LlmBuildError {
    #[error("unknown backend kind: {0}")]
    UnknownKind(String),
    #[error("client init failed: {0}")]
    Client(#[from] LlmError),
}

/// Build an OpenAI-compatible client from the classifier section.
pub fn build_client(config: &ClassifierConfig) -> Result<Arc<dyn LlmClient>, LlmBuildError> {
    match config.kind.trim().to_ascii_lowercase().as_str() {
        "openai" | "openai-compatible" => {}
        _ => return Err(LlmBuildError::UnknownKind(config.kind.clone())),
    }
    let api_key = resolve_api_key(config);
    let client = HttpLlmClient::new(HttpLlmClientConfig {
        endpoint: config.endpoint.clone(),
        api_key,
        timeout_secs: config.timeout_secs,
        ..HttpLlmClientConfig::default()
    })?;
    Ok(Arc::new(client))
}

/// Build the intent classifier from the classifier section.
pub fn build_classifier(config: &ClassifierConfig) -> Result<LlmIntentClassifier, LlmBuildError> {
    let client = build_client(config)?;
    let system_prompt = config
        .system_prompt
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
    Ok(LlmIntentClassifier::new(
        client,
        LlmIntentClassifierConfig {
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt,
        },
    ))
}

/// A missing key is not fatal: keyless OpenAI-compatible endpoints exist, and
/// a rejected call surfaces per request as a classification failure.
fn resolve_api_key(config: &ClassifierConfig) -> Option<String> {
    let env_name = config.api_key_env.as_ref()?;
    match std::env::var(env_name) {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => {
            warn!(env = %env_name, "classifier API key environment variable is not set");
            None
        }
    }
}
