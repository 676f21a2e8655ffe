//! Transaction package definitions

use serde::{Deserialize, Serialize};

use super::TransactionStep;

/// Advisory aggregate cost of a step sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Decimal amount in native-currency units, e.g. "0.003".
    pub native_amount: String,
    pub fiat_amount: f64,
}

impl CostEstimate {
    pub fn new(native_amount: impl Into<String>, fiat_amount: f64) -> Self {
        Self {
            native_amount: native_amount.into(),
            fiat_amount,
        }
    }
}

/// The reviewable plan returned to the signing client. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPackage {
    pub id: String,
    pub summary: String,
    pub explanation: String,
    pub steps: Vec<TransactionStep>,
    #[serde(rename = "estimatedGasETH")]
    pub estimated_gas_eth: String,
    #[serde(rename = "estimatedGasUSD")]
    pub estimated_gas_usd: f64,
}
