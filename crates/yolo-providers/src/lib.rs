//! Concrete outbound adapters for the intent pipeline.
//!
//! - [`EtherscanProvider`]: verified-source ABI lookup
//! - [`SourcifyProvider`]: full-match metadata lookup
//! - [`BundledAbiProvider`]: well-known ABIs shipped with the binary
//! - [`RpcGasPriceSource`]: live `eth_gasPrice` over JSON-RPC

mod bundled;
mod etherscan;
mod rpc;
mod sourcify;

pub use bundled::{erc20_abi, BundledAbiProvider};
pub use etherscan::{EtherscanProvider, ETHERSCAN_DEFAULT_ENDPOINT};
pub use rpc::RpcGasPriceSource;
pub use sourcify::{SourcifyProvider, SOURCIFY_DEFAULT_CHAIN_ID, SOURCIFY_DEFAULT_ENDPOINT};

use std::time::Duration;

use yolo_core::error::ProviderError;

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::Http(e.to_string()))
}

/// `0x` followed by 40 hex digits. Anything else is never sent upstream.
pub(crate) fn is_hex_address(address: &str) -> bool {
    let Some(hex) = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
    else {
        return false;
    };
    hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit())
}
