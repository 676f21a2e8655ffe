//! LLM clients and the intent classifier built on them.
//!
//! `HttpLlmClient` speaks the OpenAI-compatible chat completion protocol.
//! Use `build_classifier` to create a classifier from configuration.

mod classifier;
mod factory;
mod llm;

pub use classifier::{LlmIntentClassifier, LlmIntentClassifierConfig, DEFAULT_SYSTEM_PROMPT};
pub use factory::{build_classifier, build_client, LlmBuildError};
pub use llm::{HttpLlmClient, HttpLlmClientConfig, LlmClient, LlmError, LlmRequest, MockLlmClient};
