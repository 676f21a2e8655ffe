//! Wires configuration into pipeline components.

use std::sync::{Arc, Mutex, OnceLock};

use anyhow::Context;
use tracing::{info, warn};

use yolo_config::{AbiConfig, BuilderConfig, EstimatorConfig, ObservabilityConfig, YoloConfig};
use yolo_core::abi::{AbiProvider, AbiResolver};
use yolo_core::builder::{BuilderSettings, ContractBook, KnownToken, StepBuilder, TokenRegistry};
use yolo_core::estimator::{EstimatorSettings, HeuristicCostEstimator};
use yolo_core::IntentPipeline;
use yolo_providers::{BundledAbiProvider, EtherscanProvider, RpcGasPriceSource, SourcifyProvider};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once. `RUST_LOG` wins over the configured level.
pub fn init_tracing(observability: &ObservabilityConfig) {
    TRACING_INIT.get_or_init(|| {
        let fallback_level = match observability.log_level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };
        let make_filter = || {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        };

        let log_file = observability
            .log_file
            .as_deref()
            .filter(|path| !path.trim().is_empty());
        match log_file.and_then(open_log_file) {
            Some(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            None => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_target(true)
                    .try_init();
            }
        }

        info!(
            log_level = %observability.log_level,
            log_file = log_file.unwrap_or("(stdout)"),
            "tracing initialized"
        );
    });
}

fn open_log_file(path: &str) -> Option<std::fs::File> {
    use std::fs::{create_dir_all, OpenOptions};
    use std::path::Path;

    let file_path = Path::new(path);
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = create_dir_all(parent) {
                eprintln!(
                    "failed to create log directory '{}': {}",
                    parent.display(),
                    err
                );
                return None;
            }
        }
    }
    match OpenOptions::new().create(true).append(true).open(file_path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("failed to open log file '{}': {}", file_path.display(), err);
            None
        }
    }
}

/// Build the full pipeline from a validated config.
pub fn build_pipeline(config: &YoloConfig) -> anyhow::Result<IntentPipeline> {
    let settings = builder_settings(&config.builder);
    let resolver = Arc::new(build_abi_resolver(&config.abi, &settings.tokens)?);
    let builder = StepBuilder::new(settings).with_abi_resolver(resolver.clone());
    let estimator = build_estimator(&config.estimator)?;
    let classifier =
        yolo_llm::build_classifier(&config.classifier).context("build intent classifier failed")?;

    info!(
        app = %config.app.name,
        environment = %config.app.environment,
        model = %config.classifier.model,
        abi_providers = ?resolver.provider_names(),
        actions = ?builder.supported_actions(),
        "pipeline assembled"
    );
    Ok(IntentPipeline::new(
        Arc::new(classifier),
        builder,
        Arc::new(estimator),
        resolver,
    ))
}

pub fn builder_settings(config: &BuilderConfig) -> BuilderSettings {
    let mut contracts = ContractBook::default();
    let overrides = &config.contracts;
    let slots = [
        (&overrides.swap_router, &mut contracts.swap_router),
        (&overrides.wrapped_native, &mut contracts.wrapped_native),
        (&overrides.default_stable, &mut contracts.default_stable),
        (&overrides.liquid_staking, &mut contracts.liquid_staking),
        (&overrides.withdrawal_queue, &mut contracts.withdrawal_queue),
    ];
    for (value, slot) in slots {
        if let Some(address) = value.as_ref().filter(|a| !a.trim().is_empty()) {
            *slot = address.trim().to_string();
        }
    }

    let tokens = if config.tokens.is_empty() {
        TokenRegistry::default()
    } else {
        TokenRegistry::new(
            config
                .tokens
                .iter()
                .map(|t| KnownToken::new(t.symbol.trim(), t.address.trim(), t.decimals))
                .collect(),
        )
    };

    BuilderSettings {
        contracts,
        tokens,
        default_decimals: config.default_decimals,
        deadline_secs: config.deadline_secs,
        allow_zero_min_output: config.allow_zero_min_output,
    }
}

pub fn build_abi_resolver(config: &AbiConfig, tokens: &TokenRegistry) -> anyhow::Result<AbiResolver> {
    let mut providers: Vec<Arc<dyn AbiProvider>> = Vec::new();
    for spec in &config.providers {
        match spec.kind.trim().to_ascii_lowercase().as_str() {
            "etherscan" => {
                let api_key = spec
                    .api_key_env
                    .as_deref()
                    .and_then(|name| std::env::var(name).ok())
                    .filter(|key| !key.trim().is_empty());
                if api_key.is_none() {
                    warn!(
                        env = spec.api_key_env.as_deref().unwrap_or("(unset)"),
                        "etherscan api key not configured; provider skipped"
                    );
                    continue;
                }
                let provider =
                    EtherscanProvider::new(spec.endpoint.clone(), api_key, config.timeout_secs)
                        .context("build etherscan provider failed")?;
                providers.push(Arc::new(provider));
            }
            "sourcify" => {
                let provider = SourcifyProvider::new(
                    spec.endpoint.clone(),
                    spec.network.clone(),
                    config.timeout_secs,
                )
                .context("build sourcify provider failed")?;
                providers.push(Arc::new(provider));
            }
            "bundled" => {
                let provider =
                    BundledAbiProvider::erc20(tokens.tokens().iter().map(|t| t.address.as_str()));
                providers.push(Arc::new(provider));
            }
            other => anyhow::bail!("unsupported abi provider kind '{}'", other),
        }
    }
    Ok(AbiResolver::new(providers))
}

pub fn build_estimator(config: &EstimatorConfig) -> anyhow::Result<HeuristicCostEstimator> {
    let mut settings = EstimatorSettings {
        gas_price_gwei: config.gas_price_gwei,
        native_usd_price: config.native_usd_price,
        ..EstimatorSettings::default()
    };
    settings.gas_units.extend(
        config
            .gas_units
            .iter()
            .map(|(name, units)| (name.clone(), *units)),
    );

    let estimator = HeuristicCostEstimator::new(settings);
    match config.rpc_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => {
            let source = RpcGasPriceSource::new(url, config.rpc_timeout_secs)
                .context("build gas price source failed")?;
            Ok(estimator.with_gas_price_source(Arc::new(source)))
        }
        None => Ok(estimator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yolo_config::parse_config;

    #[test]
    fn test_builder_settings_apply_overrides() {
        let config = parse_config(
            r#"
builder:
  default_decimals: 8
  allow_zero_min_output: false
  contracts:
    swap_router: "0x1111111111111111111111111111111111111111"
  tokens:
    - symbol: WBTC
      address: "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"
      decimals: 8
"#,
        )
        .unwrap();

        let settings = builder_settings(&config.builder);
        assert_eq!(
            settings.contracts.swap_router,
            "0x1111111111111111111111111111111111111111"
        );
        assert_eq!(
            settings.contracts.wrapped_native,
            ContractBook::default().wrapped_native
        );
        assert_eq!(settings.default_decimals, 8);
        assert!(!settings.allow_zero_min_output);
        assert!(settings.tokens.by_symbol("wbtc").is_some());
        assert!(settings.tokens.by_symbol("USDC").is_none());
    }

    #[test]
    fn test_etherscan_without_key_is_skipped() {
        let config = parse_config(
            r#"
abi:
  providers:
    - kind: etherscan
      api_key_env: YOLO_TEST_UNSET_ETHERSCAN_KEY
    - kind: sourcify
    - kind: bundled
"#,
        )
        .unwrap();
        std::env::remove_var("YOLO_TEST_UNSET_ETHERSCAN_KEY");

        let resolver = build_abi_resolver(&config.abi, &TokenRegistry::default()).unwrap();
        assert_eq!(resolver.provider_names(), vec!["sourcify", "bundled"]);
    }

    #[tokio::test]
    async fn test_estimator_merges_gas_unit_overrides() {
        use yolo_core::estimator::CostEstimator;
        use yolo_core::types::TransactionStep;

        let config = parse_config("estimator:\n  gas_units:\n    approve: 50000\n").unwrap();
        let estimator = build_estimator(&config.estimator).unwrap();
        let steps = vec![TransactionStep::new(
            "Approve",
            "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            "approve",
        )];

        let estimate = estimator.estimate(&steps, "0xwallet").await;
        assert_eq!(estimate.native_amount, "0.001");
        assert_eq!(estimate.fiat_amount, 3.0);
    }

    #[test]
    fn test_pipeline_builds_from_default_config() {
        let config = parse_config("").unwrap();
        let pipeline = build_pipeline(&config).unwrap();
        assert_eq!(
            pipeline.builder().supported_actions(),
            vec!["approve", "stake", "swap", "transfer", "unstake"]
        );
    }
}
