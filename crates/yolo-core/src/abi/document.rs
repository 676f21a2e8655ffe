//! Opaque ABI document with just enough structure for function lookups.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

/// A resolved contract ABI. The JSON is kept verbatim; cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Abi(Arc<Value>);

/// A callable function entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    pub name: String,
    pub input_types: Vec<String>,
    pub state_mutability: String,
}

#[derive(Debug, Deserialize)]
struct RawAbiEntry {
    #[serde(rename = "type", default)]
    entry_type: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawAbiParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAbiParam {
    #[serde(rename = "type")]
    kind: String,
}

impl Abi {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// Parse an ABI shipped as a JSON string (Etherscan returns it this way).
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Value>(raw).map(Self::new)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// An ABI with no entries carries no information.
    pub fn is_empty(&self) -> bool {
        match self.0.as_ref() {
            Value::Array(entries) => entries.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    /// All function entries. Malformed entries are skipped.
    pub fn functions(&self) -> Vec<AbiFunction> {
        let Some(entries) = self.0.as_array() else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| serde_json::from_value::<RawAbiEntry>(entry.clone()).ok())
            .filter(|entry| entry.entry_type.as_deref().unwrap_or("function") == "function")
            .filter_map(|entry| {
                let name = entry.name?.trim().to_string();
                if name.is_empty() {
                    return None;
                }
                Some(AbiFunction {
                    name,
                    input_types: entry.inputs.into_iter().map(|p| p.kind).collect(),
                    state_mutability: entry
                        .state_mutability
                        .unwrap_or_else(|| "nonpayable".to_string()),
                })
            })
            .collect()
    }

    /// Function overload with `name` taking exactly `arity` inputs.
    pub fn function(&self, name: &str, arity: usize) -> Option<AbiFunction> {
        self.functions()
            .into_iter()
            .find(|f| f.name == name && f.input_types.len() == arity)
    }

    pub fn has_function_named(&self, name: &str) -> bool {
        self.functions().iter().any(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_functions_skip_events_and_fallbacks() {
        let abi = Abi::new(json!([
            {"type": "event", "name": "Transfer", "inputs": []},
            {"type": "fallback"},
            {"type": "function", "name": "approve", "stateMutability": "nonpayable",
             "inputs": [{"name": "_spender", "type": "address"}, {"name": "_value", "type": "uint256"}]}
        ]));

        let functions = abi.functions();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].input_types, vec!["address", "uint256"]);
        assert!(abi.function("approve", 1).is_none());
        assert!(abi.function("approve", 2).is_some());
    }

    #[test]
    fn test_empty_documents() {
        assert!(Abi::new(json!([])).is_empty());
        assert!(Abi::new(Value::Null).is_empty());
        assert!(Abi::from_json_str("not json").is_err());
    }
}
