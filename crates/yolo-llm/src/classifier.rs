use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use yolo_core::classifier::IntentClassifier;
use yolo_core::error::ClassificationError;
use yolo_core::types::StructuredIntent;

use crate::llm::{extract_json, truncate_for_log, LlmClient, LlmRequest};

const MAX_PROMPT_LOG_CHARS: usize = 4_000;
const MAX_LLM_OUTPUT_LOG_CHARS: usize = 8_000;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You interpret crypto-related natural language commands and convert them to structured intents.
Parse the user's command into a structured format that can be used to generate blockchain transactions.
Return a single JSON object with the following structure:
{
  \"action\": \"swap|transfer|approve|stake|unstake\",
  \"summary\": \"Brief one-line summary of what the user wants to do\",
  \"explanation\": \"Detailed but concise explanation of what will happen\",
  \"parameters\": { }
}
Parameters are action-specific. Use these names where they apply:
- swap: tokenIn, tokenOut, amount, amountOutMin
- transfer: tokenAddress, recipient, amount
- approve: tokenAddress, spender, amount
- stake / unstake: amount
Tokens may be given as a symbol (ETH, USDC) or a 0x address. Amounts are human-readable
decimal strings such as \"0.5\", except the transfer amount, which is an integer count of the
token's smallest units (5 USDC at 6 decimals is \"5000000\"). Transfer and approve take ERC-20
tokens only, never ETH. Add a `decimals` parameter only if the user states it.
Do not invent values the user did not give.";

/// Classifier settings
#[derive(Debug, Clone)]
pub struct LlmIntentClassifierConfig {
    pub model: String,
    pub temperature: f32,
    pub system_prompt: String,
}

impl Default for LlmIntentClassifierConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Intent classifier backed by a chat-completion model in JSON mode.
pub struct LlmIntentClassifier {
    client: Arc<dyn LlmClient>,
    config: LlmIntentClassifierConfig,
}

impl LlmIntentClassifier {
    pub fn new(client: Arc<dyn LlmClient>, config: LlmIntentClassifierConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, message: &str) -> Result<StructuredIntent, ClassificationError> {
        info!(
            model = %self.config.model,
            message_len = message.len(),
            "classification request prepared"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                user_prompt = %truncate_for_log(message, MAX_PROMPT_LOG_CHARS),
                "classification prompt"
            );
        }

        let request = LlmRequest {
            system: self.config.system_prompt.clone(),
            user: message.to_string(),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            json_response: true,
        };
        let output = self
            .client
            .complete(request)
            .await
            .map_err(|e| ClassificationError::Upstream(e.to_string()))?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                llm_output = %truncate_for_log(&output, MAX_LLM_OUTPUT_LOG_CHARS),
                "classification raw llm output"
            );
        }

        let intent = parse_intent(&output)?;
        info!(
            action = %intent.action,
            parameter_count = intent.parameters.len(),
            "classification parsed intent"
        );
        Ok(intent)
    }
}

fn parse_intent(output: &str) -> Result<StructuredIntent, ClassificationError> {
    let json_str = extract_json(output).ok_or_else(|| {
        ClassificationError::Malformed("LLM output did not contain a JSON object".to_string())
    })?;
    let mut value: Value = serde_json::from_str(&json_str)
        .map_err(|e| ClassificationError::Malformed(format!("invalid JSON: {}", e)))?;

    // Models sometimes emit `"parameters": null` for parameterless requests.
    if let Some(object) = value.as_object_mut() {
        if object.get("parameters").is_some_and(Value::is_null) {
            object.remove("parameters");
        }
    }

    let intent: StructuredIntent = serde_json::from_value(value)
        .map_err(|e| ClassificationError::Malformed(format!("unexpected intent shape: {}", e)))?;
    if intent.action.trim().is_empty() {
        return Err(ClassificationError::Malformed(
            "intent has an empty action".to_string(),
        ));
    }
    Ok(intent)
}
