use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use yolo_core::abi::{Abi, AbiProvider};
use yolo_core::error::ProviderError;

use crate::{http_client, is_hex_address};

pub const SOURCIFY_DEFAULT_ENDPOINT: &str = "https://sourcify.dev/server/repository";
/// Repository paths are keyed by numeric chain id.
pub const SOURCIFY_DEFAULT_CHAIN_ID: &str = "1";

/// Full-match metadata lookup on a Sourcify repository.
pub struct SourcifyProvider {
    client: reqwest::Client,
    endpoint: String,
    chain_id: String,
}

impl SourcifyProvider {
    pub fn new(
        endpoint: Option<String>,
        chain_id: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let endpoint = endpoint.unwrap_or_else(|| SOURCIFY_DEFAULT_ENDPOINT.to_string());
        Ok(Self {
            client: http_client(timeout_secs)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            chain_id: chain_id.unwrap_or_else(|| SOURCIFY_DEFAULT_CHAIN_ID.to_string()),
        })
    }

    fn metadata_url(&self, address: &str) -> String {
        format!(
            "{}/contracts/full_match/{}/{}/metadata.json",
            self.endpoint, self.chain_id, address
        )
    }
}

fn abi_from_metadata(metadata: &Value) -> Option<Abi> {
    metadata
        .pointer("/output/abi")
        .filter(|abi| abi.is_array())
        .map(|abi| Abi::new(abi.clone()))
}

#[async_trait]
impl AbiProvider for SourcifyProvider {
    fn name(&self) -> &str {
        "sourcify"
    }

    async fn fetch(&self, address: &str) -> Result<Option<Abi>, ProviderError> {
        if !is_hex_address(address) {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.metadata_url(address))
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Http(format!("HTTP {}", status)));
        }

        let metadata: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Response(e.to_string()))?;
        Ok(abi_from_metadata(&metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_url_uses_chain_id_and_trims_slash() {
        let provider = SourcifyProvider::new(
            Some("https://repo.example/".to_string()),
            Some("11155111".to_string()),
            5,
        )
        .unwrap();
        assert_eq!(
            provider.metadata_url("0xabc"),
            "https://repo.example/contracts/full_match/11155111/0xabc/metadata.json"
        );

        let provider = SourcifyProvider::new(None, None, 5).unwrap();
        assert!(provider
            .metadata_url("0xabc")
            .contains("/full_match/1/0xabc/"));
    }

    #[test]
    fn test_abi_read_from_output_section() {
        let metadata = json!({
            "compiler": {"version": "0.8.19"},
            "output": {"abi": [{"type":"function","name":"submit","inputs":[
                {"name":"_referral","type":"address"}]}]}
        });
        let abi = abi_from_metadata(&metadata).unwrap();
        assert!(abi.has_function_named("submit"));

        assert!(abi_from_metadata(&json!({"output": {}})).is_none());
        assert!(abi_from_metadata(&json!({"output": {"abi": "nope"}})).is_none());
    }
}
