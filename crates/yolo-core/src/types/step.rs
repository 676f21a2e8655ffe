//! Transaction step definitions
//!
//! A step is one contract call in a package. Field names follow the wire
//! contract of the signing client (camelCase).

use serde::{Deserialize, Serialize};

use super::new_id;

/// A bound argument of a contract call.
///
/// `value` is always a string, even for numeric and array types, so the package
/// stays transport-safe as JSON. `kind` is an ABI type tag used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionParameter {
    pub id: String,
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TransactionParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            value: value.into(),
            kind: kind.into(),
        }
    }

    pub fn address(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, "address")
    }

    pub fn uint256(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, "uint256")
    }
}

/// One contract call. Lower `order` must execute first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStep {
    pub id: String,
    pub order: u32,
    pub title: String,
    pub explanation: String,
    pub contract_address: String,
    pub function_name: String,
    pub parameters: Vec<TransactionParameter>,
    #[serde(default)]
    pub is_expanded: bool,
}

impl TransactionStep {
    /// Create a step; `order` is assigned by the builder once the sequence is final.
    pub fn new(
        title: impl Into<String>,
        contract_address: impl Into<String>,
        function_name: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            order: 0,
            title: title.into(),
            explanation: String::new(),
            contract_address: contract_address.into(),
            function_name: function_name.into(),
            parameters: Vec::new(),
            is_expanded: false,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_param(mut self, parameter: TransactionParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn param(&self, name: &str) -> Option<&TransactionParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
