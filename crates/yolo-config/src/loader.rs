//! Configuration loading and validation.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::YoloConfig;

const ABI_PROVIDER_KINDS: &[&str] = &["etherscan", "sourcify", "bundled"];
const MAX_DEADLINE_SECS: i64 = 365 * 24 * 60 * 60;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load and validate configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<YoloConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from YAML text.
pub fn parse_config(content: &str) -> Result<YoloConfig, ConfigError> {
    let config: YoloConfig = if content.trim().is_empty() {
        YoloConfig::default()
    } else {
        serde_yaml::from_str(content)?
    };
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &YoloConfig) -> Result<(), ConfigError> {
    if config.version == 0 {
        return Err(ConfigError::Invalid(
            "version must be greater than 0".to_string(),
        ));
    }

    if config.app.name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "app.name must not be empty".to_string(),
        ));
    }

    if config.server.listen.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "server.listen must not be empty".to_string(),
        ));
    }

    if config.server.body_limit_kb == 0 {
        return Err(ConfigError::Invalid(
            "server.body_limit_kb must be > 0".to_string(),
        ));
    }

    if config.classifier.endpoint.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "classifier.endpoint must not be empty".to_string(),
        ));
    }

    if config.classifier.model.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "classifier.model must not be empty".to_string(),
        ));
    }

    for (index, provider) in config.abi.providers.iter().enumerate() {
        let kind = provider.kind.trim().to_ascii_lowercase();
        if !ABI_PROVIDER_KINDS.contains(&kind.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "abi.providers[{}].kind '{}' is not one of {}",
                index,
                provider.kind,
                ABI_PROVIDER_KINDS.join(", ")
            )));
        }
        if kind == "sourcify" {
            if let Some(network) = &provider.network {
                if network.is_empty() || !network.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ConfigError::Invalid(format!(
                        "abi.providers[{}].network must be a numeric chain id, got '{}'",
                        index, network
                    )));
                }
            }
        }
    }

    if config.builder.default_decimals > 77 {
        return Err(ConfigError::Invalid(
            "builder.default_decimals must be <= 77".to_string(),
        ));
    }

    if config.builder.deadline_secs <= 0 || config.builder.deadline_secs > MAX_DEADLINE_SECS {
        return Err(ConfigError::Invalid(format!(
            "builder.deadline_secs must be in 1..={}",
            MAX_DEADLINE_SECS
        )));
    }

    for token in &config.builder.tokens {
        if token.symbol.trim().is_empty() || token.address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "builder.tokens[] requires symbol and address".to_string(),
            ));
        }
    }

    if !(config.estimator.gas_price_gwei.is_finite() && config.estimator.gas_price_gwei >= 0.0) {
        return Err(ConfigError::Invalid(
            "estimator.gas_price_gwei must be a non-negative number".to_string(),
        ));
    }

    if !(config.estimator.native_usd_price.is_finite() && config.estimator.native_usd_price >= 0.0)
    {
        return Err(ConfigError::Invalid(
            "estimator.native_usd_price must be a non-negative number".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.server.listen, "127.0.0.1:3000");
        assert_eq!(config.builder.default_decimals, 18);
        let kinds: Vec<_> = config.abi.providers.iter().map(|p| p.kind.as_str()).collect();
        assert_eq!(kinds, vec!["etherscan", "sourcify", "bundled"]);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
builder:
  default_decimals: 6
  allow_zero_min_output: false
  tokens:
    - symbol: WBTC
      address: "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"
      decimals: 8
estimator:
  gas_units:
    approve: 50000
"#,
        )
        .unwrap();

        assert_eq!(config.builder.default_decimals, 6);
        assert!(!config.builder.allow_zero_min_output);
        assert_eq!(config.builder.deadline_secs, 3600);
        assert_eq!(config.builder.tokens[0].decimals, 8);
        assert_eq!(config.estimator.gas_units.get("approve"), Some(&50_000));
        assert_eq!(config.estimator.gas_price_gwei, 20.0);
        assert_eq!(config.classifier.model, "gpt-4o");
    }

    #[test]
    fn test_unknown_provider_kind_is_rejected() {
        let result = parse_config(
            r#"
abi:
  providers:
    - kind: blockscout
"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_sourcify_network_must_be_chain_id() {
        let result = parse_config(
            r#"
abi:
  providers:
    - kind: sourcify
      network: mainnet
"#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let config = parse_config(
            r#"
abi:
  providers:
    - kind: sourcify
      network: "11155111"
"#,
        )
        .unwrap();
        assert_eq!(config.abi.providers[0].network.as_deref(), Some("11155111"));
    }

    #[test]
    fn test_deadline_outside_range_is_rejected() {
        for text in [
            "builder:\n  deadline_secs: 0",
            "builder:\n  deadline_secs: 9223372036854775807",
        ] {
            assert!(matches!(parse_config(text), Err(ConfigError::Invalid(_))));
        }
    }

    #[test]
    fn test_zero_version_is_rejected() {
        assert!(matches!(
            parse_config("version: 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            parse_config("builder: [unterminated"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_config_reads_file() {
        let path = std::env::temp_dir().join(format!("yolo-config-{}.yaml", uuid::Uuid::new_v4()));
        fs::write(&path, "app:\n  name: wallet-backend\n").unwrap();

        let config = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(config.app.name, "wallet-backend");
    }
}
