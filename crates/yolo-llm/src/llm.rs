use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LLM request payload
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    /// Ask the backend to constrain output to a single JSON object.
    pub json_response: bool,
}

/// LLM client trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError>;
}

#[async_trait]
impl LlmClient for Arc<dyn LlmClient> {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }
}

/// LLM errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Mock LLM client for tests
pub struct MockLlmClient {
    pub response: Result<String, String>,
}

impl MockLlmClient {
    pub fn replying(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: LlmRequest) -> Result<String, LlmError> {
        self.response.clone().map_err(LlmError::Http)
    }
}

/// HTTP client config (OpenAI-compatible)
#[derive(Debug, Clone)]
pub struct HttpLlmClientConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub extra_headers: HeaderMap,
}

impl Default for HttpLlmClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            timeout_secs: 30,
            extra_headers: HeaderMap::new(),
        }
    }
}

/// HTTP LLM client using an OpenAI-compatible API
pub struct HttpLlmClient {
    client: reqwest::Client,
    config: HttpLlmClientConfig,
}

impl HttpLlmClient {
    pub fn new(config: HttpLlmClientConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

fn chat_request(request: LlmRequest) -> ChatRequest {
    ChatRequest {
        model: request.model,
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: request.system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: request.user,
            },
        ],
        temperature: request.temperature,
        response_format: request.json_response.then_some(ResponseFormat {
            kind: "json_object",
        }),
    }
}

fn parse_chat_response(text: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(text).map_err(|e| LlmError::Serialization(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::Response("Missing choices".to_string()))
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        let mut headers = self.config.extra_headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = format!("Bearer {}", key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&value).map_err(|e| LlmError::Http(e.to_string()))?,
            );
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(&chat_request(request))
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Response(format!("HTTP {}: {}", status, text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        parse_chat_response(&text)
    }
}

pub(crate) fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].to_string())
}

pub(crate) fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let char_count = input.chars().count();
    if char_count <= max_chars {
        return input.to_string();
    }
    let mut preview: String = input.chars().take(max_chars).collect();
    preview.push_str(&format!("... [truncated, total_chars={}]", char_count));
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json_response: bool) -> LlmRequest {
        LlmRequest {
            system: "sys".to_string(),
            user: "swap 1 eth".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            json_response,
        }
    }

    #[test]
    fn test_chat_request_sets_json_response_format() {
        let body = serde_json::to_value(chat_request(request(true))).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "swap 1 eth");

        let body = serde_json::to_value(chat_request(request(false))).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_parse_chat_response_takes_first_choice() {
        let text = r#"{"choices":[{"message":{"role":"assistant","content":"{\"action\":\"swap\"}"}}]}"#;
        assert_eq!(parse_chat_response(text).unwrap(), r#"{"action":"swap"}"#);
    }

    #[test]
    fn test_parse_chat_response_without_content_is_error() {
        assert!(matches!(
            parse_chat_response(r#"{"choices":[]}"#),
            Err(LlmError::Response(_))
        ));
        assert!(matches!(
            parse_chat_response(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(LlmError::Response(_))
        ));
        assert!(matches!(
            parse_chat_response("not json"),
            Err(LlmError::Serialization(_))
        ));
    }

    #[test]
    fn test_extract_json_strips_fences() {
        let text = "```json\n{\"action\":\"transfer\"}\n```";
        assert_eq!(extract_json(text).unwrap(), "{\"action\":\"transfer\"}");
        assert!(extract_json("no braces here").is_none());
        assert!(extract_json("} backwards {").is_none());
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        let truncated = truncate_for_log("abcdefghij", 4);
        assert!(truncated.starts_with("abcd... [truncated, total_chars=10]"));
    }
}
