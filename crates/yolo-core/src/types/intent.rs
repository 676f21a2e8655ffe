//! Structured intent produced by the classifier.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Machine-actionable interpretation of a natural-language request.
///
/// `action` is kept as free text: the step builder is the only component that
/// decides whether an action is supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredIntent {
    pub action: String,
    pub summary: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub parameters: IntentParameters,
}

impl StructuredIntent {
    pub fn new(action: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            summary: summary.into(),
            explanation: String::new(),
            parameters: IntentParameters::default(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Lower-cased, trimmed action tag used for template lookup.
    pub fn action_key(&self) -> String {
        self.action.trim().to_ascii_lowercase()
    }
}

/// Action-specific parameters. Keys are not validated against any schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentParameters(BTreeMap<String, Value>);

impl IntentParameters {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// First non-empty value among `keys`, rendered as text.
    ///
    /// Strings are trimmed and numbers use their JSON rendering; any other JSON
    /// type counts as absent.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
