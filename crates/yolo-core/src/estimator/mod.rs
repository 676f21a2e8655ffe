//! Advisory cost estimation.
//!
//! Gas units come from a per-function table; the gas price comes from an
//! optional live source and otherwise from configuration. Estimation never
//! fails, it only loses precision.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::types::{CostEstimate, TransactionStep};
use crate::units::format_units;

const WEI_PER_GWEI: f64 = 1_000_000_000.0;
const NATIVE_DECIMALS: u8 = 18;

/// Aggregate estimate for a step sequence. Figures are advisory.
#[async_trait]
pub trait CostEstimator: Send + Sync {
    async fn estimate(&self, steps: &[TransactionStep], wallet_address: &str) -> CostEstimate;
}

/// Live fee-market price in wei per gas unit.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn gas_price_wei(&self) -> Result<U256, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct EstimatorSettings {
    /// Used when no live source is configured or it fails.
    pub gas_price_gwei: f64,
    /// Fiat price of one native-currency unit.
    pub native_usd_price: f64,
    /// Gas units for functions absent from `gas_units`.
    pub default_gas_units: u64,
    /// Function name → gas units.
    pub gas_units: HashMap<String, u64>,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        let gas_units = [
            ("approve", 46_000),
            ("transfer", 65_000),
            ("swapExactETHForTokens", 150_000),
            ("swapExactTokensForTokens", 160_000),
            ("submit", 90_000),
            ("requestWithdrawals", 130_000),
        ]
        .into_iter()
        .map(|(name, units)| (name.to_string(), units))
        .collect();
        Self {
            gas_price_gwei: 20.0,
            native_usd_price: 3_000.0,
            default_gas_units: 100_000,
            gas_units,
        }
    }
}

impl EstimatorSettings {
    pub fn units_for(&self, function_name: &str) -> u64 {
        self.gas_units
            .get(function_name)
            .copied()
            .unwrap_or(self.default_gas_units)
    }

    fn static_gas_price_wei(&self) -> U256 {
        let wei = (self.gas_price_gwei.max(0.0) * WEI_PER_GWEI).round();
        U256::from(wei as u128)
    }
}

/// Table-driven estimator with an optional live gas price.
pub struct HeuristicCostEstimator {
    settings: EstimatorSettings,
    gas_price_source: Option<Arc<dyn GasPriceSource>>,
}

impl HeuristicCostEstimator {
    pub fn new(settings: EstimatorSettings) -> Self {
        Self {
            settings,
            gas_price_source: None,
        }
    }

    pub fn with_gas_price_source(mut self, source: Arc<dyn GasPriceSource>) -> Self {
        self.gas_price_source = Some(source);
        self
    }

    async fn gas_price_wei(&self) -> U256 {
        let Some(source) = &self.gas_price_source else {
            return self.settings.static_gas_price_wei();
        };
        match source.gas_price_wei().await {
            Ok(price) if !price.is_zero() => price,
            Ok(_) => {
                warn!(
                    source = source.name(),
                    "gas price source returned zero; using configured price"
                );
                self.settings.static_gas_price_wei()
            }
            Err(err) => {
                warn!(
                    source = source.name(),
                    error = %err,
                    "gas price source failed; using configured price"
                );
                self.settings.static_gas_price_wei()
            }
        }
    }
}

#[async_trait]
impl CostEstimator for HeuristicCostEstimator {
    async fn estimate(&self, steps: &[TransactionStep], wallet_address: &str) -> CostEstimate {
        let total_units: u64 = steps
            .iter()
            .map(|step| self.settings.units_for(&step.function_name))
            .fold(0u64, u64::saturating_add);
        let gas_price = self.gas_price_wei().await;
        let total_wei = U256::from(total_units).saturating_mul(gas_price);

        let native_amount = format_units(total_wei, NATIVE_DECIMALS);
        let native_value = native_amount.parse::<f64>().unwrap_or_default();
        let fiat_amount = round_cents(native_value * self.settings.native_usd_price);

        debug!(
            wallet = %wallet_address,
            step_count = steps.len(),
            total_units,
            gas_price_wei = %gas_price,
            native_amount = %native_amount,
            fiat_amount,
            "cost estimated"
        );
        CostEstimate::new(native_amount, fiat_amount)
    }
}

fn round_cents(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}
