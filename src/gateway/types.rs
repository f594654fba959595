//! Gateway feature keys, errors and the `Served` result type.

use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;

/// Features that own a cache entry and a call lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKey {
    FeedSummary,
    GlobalEchoes,
}

impl FeatureKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::FeedSummary => "feed-summary",
            FeatureKey::GlobalEchoes => "global-echoes",
        }
    }

    /// Key of the persisted cache entry.
    pub fn cache_key(&self) -> &'static str {
        match self {
            FeatureKey::FeedSummary => crate::storage::SUMMARY_CACHE_KEY,
            FeatureKey::GlobalEchoes => crate::storage::ECHO_CACHE_KEY,
        }
    }
}

impl std::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced inside the gateway. None of these reach end users.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The circuit breaker is open.
    #[error("neural cooldown: {remaining_ms}ms until the circuit closes")]
    Cooldown { remaining_ms: u64 },

    /// Rate limiting persisted past the retry budget.
    #[error("rate limited after retries: {0}")]
    RateLimited(ProviderError),

    /// Any other provider failure.
    #[error("{0}")]
    Provider(ProviderError),

    /// The provider answered with something unusable.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Why a feature did not serve a fresh remote result.
#[derive(Debug, Clone)]
pub enum Degraded {
    CircuitOpen,
    /// Another call for the same feature is in flight.
    CallInFlight,
    Failed(GatewayError),
}

/// Where a served value came from.
#[derive(Debug, Clone)]
pub enum ServedFrom {
    /// A remote call just produced it.
    Remote,
    /// A fresh cache entry.
    Cache,
    /// A cache entry past its freshness, used because the remote path was unavailable.
    StaleCache(Degraded),
    /// The static fallback for the feature.
    Fallback(Degraded),
    /// Nothing to process; fixed placeholder.
    Placeholder,
}

impl ServedFrom {
    /// Coarse label exposed to clients and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ServedFrom::Remote => "remote",
            ServedFrom::Cache => "cache",
            ServedFrom::StaleCache(_) => "stale",
            ServedFrom::Fallback(_) => "fallback",
            ServedFrom::Placeholder => "placeholder",
        }
    }

    pub fn degraded(&self) -> Option<&Degraded> {
        match self {
            ServedFrom::StaleCache(d) | ServedFrom::Fallback(d) => Some(d),
            _ => None,
        }
    }
}

/// A value that is always usable, tagged with its provenance.
#[derive(Debug, Clone)]
pub struct Served<T> {
    pub data: T,
    pub source: ServedFrom,
}

impl<T> Served<T> {
    pub fn new(data: T, source: ServedFrom) -> Self {
        Self { data, source }
    }

    /// Collapse to the plain value.
    pub fn into_data(self) -> T {
        self.data
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.source, ServedFrom::Remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ServedFrom::Remote.label(), "remote");
        assert_eq!(ServedFrom::StaleCache(Degraded::CallInFlight).label(), "stale");
        assert_eq!(ServedFrom::Fallback(Degraded::CircuitOpen).label(), "fallback");
        assert!(ServedFrom::Cache.degraded().is_none());
    }

    #[test]
    fn test_feature_keys() {
        assert_eq!(FeatureKey::FeedSummary.cache_key(), "nexus_pulse_summary_cache");
        assert_eq!(FeatureKey::GlobalEchoes.to_string(), "global-echoes");
    }

    #[test]
    fn test_cooldown_display() {
        let err = GatewayError::Cooldown { remaining_ms: 1200 };
        assert_eq!(err.to_string(), "neural cooldown: 1200ms until the circuit closes");
    }
}
