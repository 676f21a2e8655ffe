use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use yolo_core::abi::{Abi, AbiProvider};
use yolo_core::error::ProviderError;

/// The standard ERC-20 interface.
pub fn erc20_abi() -> Abi {
    fn function(
        name: &str,
        inputs: &[(&str, &str)],
        output: &str,
        mutability: &str,
    ) -> serde_json::Value {
        let inputs: Vec<_> = inputs
            .iter()
            .map(|(name, kind)| json!({"name": name, "type": kind}))
            .collect();
        json!({
            "type": "function",
            "name": name,
            "inputs": inputs,
            "outputs": [{"name": "", "type": output}],
            "stateMutability": mutability,
        })
    }

    Abi::new(json!([
        function("name", &[], "string", "view"),
        function("symbol", &[], "string", "view"),
        function("decimals", &[], "uint8", "view"),
        function("totalSupply", &[], "uint256", "view"),
        function("balanceOf", &[("_owner", "address")], "uint256", "view"),
        function(
            "allowance",
            &[("_owner", "address"), ("_spender", "address")],
            "uint256",
            "view"
        ),
        function(
            "approve",
            &[("_spender", "address"), ("_value", "uint256")],
            "bool",
            "nonpayable"
        ),
        function(
            "transfer",
            &[("_to", "address"), ("_value", "uint256")],
            "bool",
            "nonpayable"
        ),
        function(
            "transferFrom",
            &[("_from", "address"), ("_to", "address"), ("_value", "uint256")],
            "bool",
            "nonpayable"
        ),
    ]))
}

/// ABIs shipped with the binary, keyed by lower-cased address. Placed last in
/// the chain so verified upstream sources win.
#[derive(Default)]
pub struct BundledAbiProvider {
    abis: HashMap<String, Abi>,
}

impl BundledAbiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the ERC-20 ABI for every given token address.
    pub fn erc20<'a>(addresses: impl IntoIterator<Item = &'a str>) -> Self {
        let abi = erc20_abi();
        addresses
            .into_iter()
            .fold(Self::new(), |provider, address| provider.with_abi(address, abi.clone()))
    }

    pub fn with_abi(mut self, address: &str, abi: Abi) -> Self {
        self.abis.insert(address.trim().to_ascii_lowercase(), abi);
        self
    }

    pub fn len(&self) -> usize {
        self.abis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abis.is_empty()
    }
}

#[async_trait]
impl AbiProvider for BundledAbiProvider {
    fn name(&self) -> &str {
        "bundled"
    }

    async fn fetch(&self, address: &str) -> Result<Option<Abi>, ProviderError> {
        Ok(self.abis.get(&address.trim().to_ascii_lowercase()).cloned())
    }
}
