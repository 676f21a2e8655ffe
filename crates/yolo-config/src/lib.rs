//! # Yolo Config
//!
//! Single-file configuration for the intent server. One `yolo.yaml`
//! configures the classifier backend, the ABI provider chain, builder
//! contracts and tokens, cost estimation, and observability. Every section
//! has defaults, so an empty file is a valid configuration.

mod loader;

pub use loader::{load_config, parse_config, ConfigError};

use std::collections::HashMap;

use serde::Deserialize;

/// Top-level configuration schema.
#[derive(Debug, Clone, Deserialize)]
pub struct YoloConfig {
    /// Config schema version.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub abi: AbiConfig,
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
            server: ServerConfig::default(),
            classifier: ClassifierConfig::default(),
            abi: AbiConfig::default(),
            builder: BuilderConfig::default(),
            estimator: EstimatorConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            environment: default_env(),
        }
    }
}

fn default_app_name() -> String {
    "yolo".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Accept cross-origin requests from any origin (browser wallets).
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
    #[serde(default = "default_body_limit_kb")]
    pub body_limit_kb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            cors_permissive: true,
            body_limit_kb: default_body_limit_kb(),
        }
    }
}

fn default_body_limit_kb() -> usize {
    64
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

/// OpenAI-compatible chat completion backend used for classification.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_kind")]
    pub kind: String,
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_classifier_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_classifier_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: default_classifier_kind(),
            endpoint: default_classifier_endpoint(),
            api_key_env: default_classifier_key_env(),
            model: default_classifier_model(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            system_prompt: None,
        }
    }
}

fn default_classifier_kind() -> String {
    "openai".to_string()
}

fn default_classifier_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_classifier_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}

fn default_classifier_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Ordered ABI provider chain. Earlier providers win.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiConfig {
    #[serde(default = "default_abi_providers")]
    pub providers: Vec<AbiProviderSpec>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AbiConfig {
    fn default() -> Self {
        Self {
            providers: default_abi_providers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_abi_providers() -> Vec<AbiProviderSpec> {
    vec![
        AbiProviderSpec {
            kind: "etherscan".to_string(),
            endpoint: None,
            api_key_env: Some("ETHERSCAN_API_KEY".to_string()),
            network: None,
        },
        AbiProviderSpec {
            kind: "sourcify".to_string(),
            endpoint: None,
            api_key_env: None,
            network: Some("1".to_string()),
        },
        AbiProviderSpec {
            kind: "bundled".to_string(),
            endpoint: None,
            api_key_env: None,
            network: None,
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiProviderSpec {
    /// `etherscan`, `sourcify` or `bundled`.
    pub kind: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Numeric chain id (`1` for Ethereum mainnet). Used by `sourcify`.
    #[serde(default)]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuilderConfig {
    /// Precision assumed for tokens with unknown metadata.
    #[serde(default = "default_decimals")]
    pub default_decimals: u8,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: i64,
    /// Build swaps with `amountOutMin = 0` when the request names no minimum.
    #[serde(default = "default_true")]
    pub allow_zero_min_output: bool,
    #[serde(default)]
    pub contracts: ContractsConfig,
    /// Replaces the built-in token list when non-empty.
    #[serde(default)]
    pub tokens: Vec<TokenSpec>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_decimals: default_decimals(),
            deadline_secs: default_deadline_secs(),
            allow_zero_min_output: true,
            contracts: ContractsConfig::default(),
            tokens: Vec::new(),
        }
    }
}

fn default_decimals() -> u8 {
    18
}

fn default_deadline_secs() -> i64 {
    3600
}

fn default_true() -> bool {
    true
}

/// Overrides for the well-known contracts. Unset fields keep built-in values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractsConfig {
    #[serde(default)]
    pub swap_router: Option<String>,
    #[serde(default)]
    pub wrapped_native: Option<String>,
    #[serde(default)]
    pub default_stable: Option<String>,
    #[serde(default)]
    pub liquid_staking: Option<String>,
    #[serde(default)]
    pub withdrawal_queue: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSpec {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default = "default_gas_price_gwei")]
    pub gas_price_gwei: f64,
    #[serde(default = "default_native_usd_price")]
    pub native_usd_price: f64,
    /// JSON-RPC endpoint for a live `eth_gasPrice`.
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    /// Function name → gas units, merged over the built-in table.
    #[serde(default)]
    pub gas_units: HashMap<String, u64>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            gas_price_gwei: default_gas_price_gwei(),
            native_usd_price: default_native_usd_price(),
            rpc_url: None,
            rpc_timeout_secs: default_rpc_timeout_secs(),
            gas_units: HashMap::new(),
        }
    }
}

fn default_gas_price_gwei() -> f64 {
    20.0
}

fn default_native_usd_price() -> f64 {
    3000.0
}

fn default_rpc_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
