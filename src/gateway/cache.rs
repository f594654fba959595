//! Per-feature TTL cache for AI-derived content.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::gateway::types::FeatureKey;
use crate::observability::metrics;
use crate::storage::{read_json, write_json, KvStore, StorageError};

/// A persisted feature result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    /// Write time in epoch milliseconds.
    #[serde(rename = "timestamp")]
    pub written_at: u64,
    #[serde(default, alias = "postHash", skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Hash of a set of ids, independent of their order.
pub fn content_hash<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let mut ids: Vec<&str> = ids.into_iter().collect();
    ids.sort_unstable();
    hex::encode(Sha256::digest(ids.join(",").as_bytes()))
}

#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl TtlCache {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, config: CacheConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn ttl_ms(&self, feature: FeatureKey) -> u64 {
        match feature {
            FeatureKey::FeedSummary => self.config.summary_ttl_ms,
            FeatureKey::GlobalEchoes => self.config.echoes_ttl_ms,
        }
    }

    pub fn get<T: DeserializeOwned>(&self, feature: FeatureKey) -> Option<CacheEntry<T>> {
        read_json(self.store.as_ref(), feature.cache_key())
    }

    /// Age of the stored entry, if any, regardless of its data type.
    pub fn age_ms(&self, feature: FeatureKey) -> Option<u64> {
        self.get::<serde_json::Value>(feature)
            .map(|entry| self.clock.now_ms().saturating_sub(entry.written_at))
    }

    /// Fresh while younger than the feature TTL. For the summary, an unchanged
    /// input hash also counts as fresh when the override is enabled.
    pub fn is_fresh<T>(&self, feature: FeatureKey, entry: &CacheEntry<T>, current_hash: Option<&str>) -> bool {
        let age = self.clock.now_ms().saturating_sub(entry.written_at);
        if age < self.ttl_ms(feature) {
            return true;
        }

        feature == FeatureKey::FeedSummary
            && self.config.summary_hash_overrides_ttl
            && current_hash.is_some()
            && entry.content_hash.as_deref() == current_hash
    }

    /// Overwrite the entry for `feature` with `data` written now.
    pub fn put<T: Serialize>(
        &self,
        feature: FeatureKey,
        data: &T,
        content_hash: Option<String>,
    ) -> Result<(), StorageError> {
        let entry = CacheEntry {
            data,
            written_at: self.clock.now_ms(),
            content_hash,
        };
        write_json(self.store.as_ref(), feature.cache_key(), &entry)?;
        metrics::record_cache_write(feature.as_str());
        Ok(())
    }
}
