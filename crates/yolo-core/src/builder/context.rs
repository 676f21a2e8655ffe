//! Parameter binding helpers shared by all templates.
//!
//! A template parameter is bound from the intent by key (with aliases), from a
//! documented default when the key is absent, or from context such as the
//! caller's wallet and the build time.

use std::fmt;

use alloy_primitives::U256;
use chrono::{DateTime, Utc};

use crate::error::StepBuildError;
use crate::types::StructuredIntent;
use crate::units::to_base_units;

use super::settings::{BuilderSettings, NATIVE_SYMBOL};

/// Where a token's decimal precision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionSource {
    /// The intent carried an explicit `decimals` value.
    Intent,
    /// The token is the chain's native currency.
    Native,
    /// The token is listed in the configured registry.
    TokenRegistry,
    /// Nothing was known; the configured default was assumed.
    Default,
}

impl PrecisionSource {
    pub fn is_assumed(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for PrecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Intent => "stated in request",
            Self::Native => "native currency",
            Self::TokenRegistry => "known token",
            Self::Default => "assumed default, token precision unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub decimals: u8,
    pub source: PrecisionSource,
}

/// A token reference resolved to a contract address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub label: String,
    pub address: String,
    pub decimals: Option<u8>,
    pub is_native: bool,
}

/// A human amount converted to smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAmount {
    pub human: String,
    pub base_units: U256,
    pub precision: Precision,
}

impl NormalizedAmount {
    pub fn value(&self) -> String {
        self.base_units.to_string()
    }

    /// One-line note for step explanations.
    pub fn describe(&self) -> String {
        format!(
            "{} converted at {} decimals ({}).",
            self.human, self.precision.decimals, self.precision.source
        )
    }
}

pub struct TemplateContext<'a> {
    pub intent: &'a StructuredIntent,
    pub wallet_address: &'a str,
    pub now: DateTime<Utc>,
    pub settings: &'a BuilderSettings,
}

impl<'a> TemplateContext<'a> {
    pub fn new(
        intent: &'a StructuredIntent,
        wallet_address: &'a str,
        now: DateTime<Utc>,
        settings: &'a BuilderSettings,
    ) -> Self {
        Self {
            intent,
            wallet_address,
            now,
            settings,
        }
    }

    pub fn text(&self, keys: &[&str]) -> Option<String> {
        self.intent.parameters.text(keys)
    }

    pub fn text_or(&self, keys: &[&str], default: &str) -> String {
        self.text(keys).unwrap_or_else(|| default.to_string())
    }

    /// Resolve a token reference. Hex addresses pass through verbatim, symbols
    /// go through the registry, and an absent key falls back to `default`
    /// (itself an address or symbol).
    pub fn token(&self, keys: &[&str], default: &str) -> Result<ResolvedToken, StepBuildError> {
        let raw = self.text_or(keys, default);
        self.resolve_token(&raw)
    }

    fn resolve_token(&self, raw: &str) -> Result<ResolvedToken, StepBuildError> {
        let registry = &self.settings.tokens;
        if raw.eq_ignore_ascii_case(NATIVE_SYMBOL) {
            return Ok(ResolvedToken {
                label: NATIVE_SYMBOL.to_string(),
                address: self.settings.contracts.wrapped_native.clone(),
                decimals: Some(18),
                is_native: true,
            });
        }
        if raw.starts_with("0x") || raw.starts_with("0X") {
            let known = registry.by_address(raw);
            return Ok(ResolvedToken {
                label: known
                    .map(|t| t.symbol.clone())
                    .unwrap_or_else(|| raw.to_string()),
                address: raw.to_string(),
                decimals: known.map(|t| t.decimals),
                is_native: false,
            });
        }
        registry
            .by_symbol(raw)
            .map(|t| ResolvedToken {
                label: t.symbol.clone(),
                address: t.address.clone(),
                decimals: Some(t.decimals),
                is_native: false,
            })
            .ok_or_else(|| StepBuildError::UnknownToken {
                symbol: raw.to_string(),
            })
    }

    /// Precision for `token`: explicit intent value, then token metadata, then
    /// the configured default.
    pub fn precision(&self, token: &ResolvedToken, decimal_keys: &[&str]) -> Precision {
        if let Some(decimals) = self
            .text(decimal_keys)
            .and_then(|raw| raw.parse::<u8>().ok())
        {
            return Precision {
                decimals,
                source: PrecisionSource::Intent,
            };
        }
        match token.decimals {
            Some(decimals) if token.is_native => Precision {
                decimals,
                source: PrecisionSource::Native,
            },
            Some(decimals) => Precision {
                decimals,
                source: PrecisionSource::TokenRegistry,
            },
            None => Precision {
                decimals: self.settings.default_decimals,
                source: PrecisionSource::Default,
            },
        }
    }

    /// Read a human amount and convert it to smallest units of `token`.
    pub fn amount(
        &self,
        keys: &[&str],
        default: &str,
        token: &ResolvedToken,
        decimal_keys: &[&str],
    ) -> Result<NormalizedAmount, StepBuildError> {
        let human = self.text_or(keys, default);
        let precision = self.precision(token, decimal_keys);
        let base_units = to_base_units(&human, precision.decimals).map_err(|reason| {
            StepBuildError::InvalidAmount {
                name: keys.first().copied().unwrap_or("amount").to_string(),
                value: human.clone(),
                reason,
            }
        })?;
        Ok(NormalizedAmount {
            human,
            base_units,
            precision,
        })
    }

    /// Read an amount that is already an integer count of smallest units.
    pub fn base_units(&self, keys: &[&str], default: &str) -> Result<U256, StepBuildError> {
        let raw = self.text_or(keys, default);
        to_base_units(&raw, 0).map_err(|reason| StepBuildError::InvalidAmount {
            name: keys.first().copied().unwrap_or("amount").to_string(),
            value: raw.clone(),
            reason: format!("expected a whole number of smallest units ({})", reason),
        })
    }

    /// Resolve a token that must be an ERC-20 contract.
    pub fn erc20_token(
        &self,
        keys: &[&str],
        default: &str,
    ) -> Result<ResolvedToken, StepBuildError> {
        let token = self.token(keys, default)?;
        if token.is_native {
            return Err(StepBuildError::NativeCurrency {
                action: self.intent.action.clone(),
            });
        }
        Ok(token)
    }

    /// Unix-seconds deadline `deadline_secs` after build time. Saturates
    /// instead of overflowing.
    pub fn deadline(&self) -> String {
        self.now
            .timestamp()
            .saturating_add(self.settings.deadline_secs)
            .to_string()
    }
}
