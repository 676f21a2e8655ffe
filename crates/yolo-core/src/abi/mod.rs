//! ABI resolution
//!
//! Providers are tried in priority order behind one capability trait; the first
//! non-empty document wins. Results, positive or negative, are cached for the
//! lifetime of the process since deployed ABIs are immutable.

mod cache;
mod document;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{AbiResolveError, ProviderError};

pub use cache::{normalize_address_key, AbiCache};
pub use document::{Abi, AbiFunction};

/// One external ABI source.
///
/// `Ok(None)` signals absence. Errors are treated exactly like absence by the
/// resolver, they only differ in how they are logged.
#[async_trait]
pub trait AbiProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, address: &str) -> Result<Option<Abi>, ProviderError>;
}

/// Multi-source resolver with a shared, unbounded cache.
pub struct AbiResolver {
    providers: Vec<Arc<dyn AbiProvider>>,
    cache: AbiCache,
}

impl AbiResolver {
    pub fn new(providers: Vec<Arc<dyn AbiProvider>>) -> Self {
        Self {
            providers,
            cache: AbiCache::new(),
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn cache(&self) -> &AbiCache {
        &self.cache
    }

    /// Resolve `address` to its ABI. Absence is `Ok(None)`.
    ///
    /// Two concurrent misses for the same address may both reach the providers;
    /// either cache write is acceptable.
    pub async fn resolve(&self, address: &str) -> Result<Option<Abi>, AbiResolveError> {
        let address = address.trim();
        let key = normalize_address_key(address);
        if let Some(cached) = self.cache.get(&key)? {
            debug!(address = %key, found = cached.is_some(), "abi cache hit");
            return Ok(cached);
        }

        let mut resolved = None;
        for provider in &self.providers {
            match provider.fetch(address).await {
                Ok(Some(abi)) if !abi.is_empty() => {
                    info!(
                        address = %key,
                        provider = provider.name(),
                        functions = abi.functions().len(),
                        "abi resolved"
                    );
                    resolved = Some(abi);
                    break;
                }
                Ok(_) => {
                    debug!(address = %key, provider = provider.name(), "abi not found at provider");
                }
                Err(err) => {
                    warn!(
                        address = %key,
                        provider = provider.name(),
                        error = %err,
                        "abi provider failed; trying next"
                    );
                }
            }
        }

        if resolved.is_none() {
            info!(address = %key, providers = self.providers.len(), "abi not found");
        }
        self.cache.insert(key, resolved.clone())?;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        name: &'static str,
        calls: AtomicUsize,
        outcome: fn() -> Result<Option<Abi>, ProviderError>,
    }

    impl CountingProvider {
        fn new(name: &'static str, outcome: fn() -> Result<Option<Abi>, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicUsize::new(0),
                outcome,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AbiProvider for CountingProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _address: &str) -> Result<Option<Abi>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn erc20_like() -> Result<Option<Abi>, ProviderError> {
        Ok(Some(Abi::new(json!([{
            "type": "function",
            "name": "transfer",
            "inputs": [{"name": "_to", "type": "address"}, {"name": "_value", "type": "uint256"}]
        }]))))
    }

    fn network_down() -> Result<Option<Abi>, ProviderError> {
        Err(ProviderError::Http("connection refused".to_string()))
    }

    fn absent() -> Result<Option<Abi>, ProviderError> {
        Ok(None)
    }

    fn chain(providers: &[&Arc<CountingProvider>]) -> Vec<Arc<dyn AbiProvider>> {
        providers
            .iter()
            .map(|p| Arc::clone(*p) as Arc<dyn AbiProvider>)
            .collect()
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let primary = CountingProvider::new("primary", erc20_like);
        let resolver = AbiResolver::new(chain(&[&primary]));

        let first = resolver.resolve("0xAbC").await.unwrap();
        let second = resolver.resolve("0xAbC").await.unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test]
    async fn test_negative_result_is_cached() {
        let primary = CountingProvider::new("primary", absent);
        let fallback = CountingProvider::new("fallback", network_down);
        let resolver = AbiResolver::new(chain(&[&primary, &fallback]));

        assert!(resolver.resolve("0xdead").await.unwrap().is_none());
        assert!(resolver.resolve("0xdead").await.unwrap().is_none());

        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
        assert_eq!(resolver.cache().len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_through_to_next() {
        let primary = CountingProvider::new("primary", network_down);
        let fallback = CountingProvider::new("fallback", erc20_like);
        let resolver = AbiResolver::new(chain(&[&primary, &fallback]));

        let abi = resolver.resolve("0x1234").await.unwrap().unwrap();

        assert!(abi.function("transfer", 2).is_some());
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_first_hit_stops_the_chain() {
        let primary = CountingProvider::new("primary", erc20_like);
        let fallback = CountingProvider::new("fallback", erc20_like);
        let resolver = AbiResolver::new(chain(&[&primary, &fallback]));

        resolver.resolve("0x1234").await.unwrap();

        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_key_ignores_case() {
        let primary = CountingProvider::new("primary", erc20_like);
        let resolver = AbiResolver::new(chain(&[&primary]));

        resolver.resolve("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").await.unwrap();
        resolver.resolve(" 0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").await.unwrap();

        assert_eq!(primary.calls(), 1);
    }

    struct ExactAddressProvider;

    #[async_trait]
    impl AbiProvider for ExactAddressProvider {
        fn name(&self) -> &str {
            "exact"
        }

        async fn fetch(&self, address: &str) -> Result<Option<Abi>, ProviderError> {
            if address.len() != 42 || !address.starts_with("0x") {
                return Ok(None);
            }
            erc20_like()
        }
    }

    #[tokio::test]
    async fn test_padded_address_reaches_providers_trimmed() {
        let resolver = AbiResolver::new(vec![
            Arc::new(ExactAddressProvider) as Arc<dyn AbiProvider>,
        ]);

        let padded = resolver
            .resolve("  0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48\n")
            .await
            .unwrap();
        let exact = resolver
            .resolve("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")
            .await
            .unwrap();

        assert!(padded.is_some());
        assert!(exact.is_some());
    }

    #[tokio::test]
    async fn test_no_providers_yields_not_found() {
        let resolver = AbiResolver::new(Vec::new());
        assert!(resolver.resolve("0x1").await.unwrap().is_none());
    }
}
