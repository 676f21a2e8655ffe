use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};

use yolo_core::error::ProviderError;
use yolo_core::estimator::GasPriceSource;

use crate::http_client;

/// Live gas price from an Ethereum JSON-RPC endpoint.
pub struct RpcGasPriceSource {
    client: reqwest::Client,
    url: String,
}

impl RpcGasPriceSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            url: url.into(),
        })
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(format!("{method} failed: {e}")))?;
        if !response.status().is_success() {
            return Err(ProviderError::Http(format!(
                "{method} failed: HTTP {}",
                response.status()
            )));
        }
        let value: Value = response.json().await.map_err(|e| {
            ProviderError::Response(format!("failed to parse {method} response JSON: {e}"))
        })?;
        if let Some(error) = value.get("error") {
            return Err(ProviderError::Response(format!(
                "rpc returned error for {method}: {error}"
            )));
        }
        Ok(value)
    }
}

fn parse_hex_u256(raw: &str, field: &str) -> Result<U256, ProviderError> {
    let value = raw.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ProviderError::Response(format!("{field} must be 0x-prefixed hex")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    if digits.len() > 64 {
        return Err(ProviderError::Response(format!("{field} exceeds 32 bytes")));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| ProviderError::Response(format!("failed to parse {field} as hex: {e}")))
}

fn gas_price_from_response(response: &Value) -> Result<U256, ProviderError> {
    let raw = response
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::Response("eth_gasPrice result was missing".to_string()))?;
    parse_hex_u256(raw, "eth_gasPrice")
}

#[async_trait]
impl GasPriceSource for RpcGasPriceSource {
    fn name(&self) -> &str {
        "rpc"
    }

    async fn gas_price_wei(&self) -> Result<U256, ProviderError> {
        let response = self.rpc_call("eth_gasPrice", json!([])).await?;
        gas_price_from_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_price_parsed_from_hex_result() {
        let response = json!({"jsonrpc":"2.0","id":1,"result":"0x3b9aca00"});
        assert_eq!(
            gas_price_from_response(&response).unwrap(),
            U256::from(1_000_000_000u64)
        );
    }

    #[test]
    fn test_missing_or_bad_result_is_response_error() {
        assert!(matches!(
            gas_price_from_response(&json!({"jsonrpc":"2.0","id":1})),
            Err(ProviderError::Response(_))
        ));
        assert!(matches!(
            gas_price_from_response(&json!({"result":"1000"})),
            Err(ProviderError::Response(_))
        ));
        assert!(matches!(
            gas_price_from_response(&json!({"result":"0xzz"})),
            Err(ProviderError::Response(_))
        ));
    }

    #[test]
    fn test_empty_hex_is_zero() {
        assert_eq!(parse_hex_u256("0x", "price").unwrap(), U256::ZERO);
    }
}
