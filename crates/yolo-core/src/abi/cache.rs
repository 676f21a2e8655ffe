//! Process-wide ABI cache.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::AbiResolveError;

use super::Abi;

/// Cache key for a contract address: trimmed and lower-cased, so checksummed
/// and plain spellings share one entry.
pub fn normalize_address_key(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Unbounded address → ABI map. `None` values are negative results.
///
/// Starts empty and is only cleared by a restart.
#[derive(Default)]
pub struct AbiCache {
    entries: RwLock<HashMap<String, Option<Abi>>>,
}

impl AbiCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outer `None` is a miss; `Some(None)` is a cached negative result.
    pub fn get(&self, key: &str) -> Result<Option<Option<Abi>>, AbiResolveError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AbiResolveError::Cache(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    pub fn insert(&self, key: String, abi: Option<Abi>) -> Result<(), AbiResolveError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AbiResolveError::Cache(e.to_string()))?;
        entries.insert(key, abi);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, AbiResolveError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| AbiResolveError::Cache(e.to_string()))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, AbiResolveError> {
        Ok(self.len()? == 0)
    }
}
