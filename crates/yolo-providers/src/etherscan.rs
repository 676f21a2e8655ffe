use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use yolo_core::abi::{Abi, AbiProvider};
use yolo_core::error::ProviderError;

use crate::{http_client, is_hex_address};

pub const ETHERSCAN_DEFAULT_ENDPOINT: &str = "https://api.etherscan.io/api";

/// Verified-source ABI lookup via `module=contract&action=getabi`.
pub struct EtherscanProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl EtherscanProvider {
    pub fn new(
        endpoint: Option<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            endpoint: endpoint.unwrap_or_else(|| ETHERSCAN_DEFAULT_ENDPOINT.to_string()),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Status `"1"` carries the ABI as a JSON-encoded string in `result`; any
/// other status (unverified contract, bad address) means no ABI here.
fn parse_getabi_response(body: &str) -> Result<Option<Abi>, ProviderError> {
    let response: EtherscanResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Response(e.to_string()))?;
    if response.status != "1" {
        debug!(message = %response.message, "etherscan returned no abi");
        return Ok(None);
    }
    let raw = response
        .result
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ProviderError::Response("getabi result was not a string".to_string()))?;
    let abi = Abi::from_json_str(raw)
        .map_err(|e| ProviderError::Response(format!("getabi result is not JSON: {}", e)))?;
    Ok(Some(abi))
}

#[async_trait]
impl AbiProvider for EtherscanProvider {
    fn name(&self) -> &str {
        "etherscan"
    }

    async fn fetch(&self, address: &str) -> Result<Option<Abi>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("etherscan api key".to_string()))?;
        if !is_hex_address(address) {
            return Ok(None);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("module", "contract"),
                ("action", "getabi"),
                ("address", address),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::Http(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        parse_getabi_response(&body)
    }
}
