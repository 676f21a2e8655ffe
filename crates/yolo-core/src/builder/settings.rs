//! Builder settings: well-known contracts, token registry and precision policy.

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Decimal precision assumed when nothing better is known about a token.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Native-currency symbol; resolved to the wrapped-native contract for calls.
pub const NATIVE_SYMBOL: &str = "ETH";

/// Contracts the built-in templates call when the intent does not name one.
#[derive(Debug, Clone)]
pub struct ContractBook {
    pub swap_router: String,
    pub wrapped_native: String,
    pub default_stable: String,
    pub liquid_staking: String,
    pub withdrawal_queue: String,
}

impl Default for ContractBook {
    fn default() -> Self {
        Self {
            swap_router: "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D".to_string(),
            wrapped_native: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
            default_stable: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            liquid_staking: "0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84".to_string(),
            withdrawal_queue: "0x889edC2eDab5f40e902b864aD4d7AdE8E412F9B1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownToken {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
}

impl KnownToken {
    pub fn new(symbol: impl Into<String>, address: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            address: address.into(),
            decimals,
        }
    }
}

/// Symbol/address → token metadata. Lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<KnownToken>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<KnownToken>) -> Self {
        Self { tokens }
    }

    pub fn empty() -> Self {
        Self { tokens: Vec::new() }
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&KnownToken> {
        let symbol = symbol.trim();
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn by_address(&self, address: &str) -> Option<&KnownToken> {
        let address = address.trim();
        self.tokens
            .iter()
            .find(|t| t.address.eq_ignore_ascii_case(address))
    }

    pub fn tokens(&self) -> &[KnownToken] {
        &self.tokens
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new(vec![
            KnownToken::new("WETH", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18),
            KnownToken::new("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6),
            KnownToken::new("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7", 6),
            KnownToken::new("DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18),
            KnownToken::new("stETH", "0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84", 18),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct BuilderSettings {
    pub contracts: ContractBook,
    pub tokens: TokenRegistry,
    /// Precision used for amounts of tokens with no known metadata.
    pub default_decimals: u8,
    /// Swap deadline offset from build time.
    pub deadline_secs: i64,
    /// Allow swaps without price-impact protection when the intent names no
    /// minimum output. When false such swaps are rejected.
    pub allow_zero_min_output: bool,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            contracts: ContractBook::default(),
            tokens: TokenRegistry::default(),
            default_decimals: DEFAULT_DECIMALS,
            deadline_secs: 3600,
            allow_zero_min_output: true,
        }
    }
}
