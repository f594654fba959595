//! Resilient external-call gateway.
//!
//! # Data Flow
//! ```text
//! feature call (summary, echoes)
//!     → empty input? → placeholder
//!     → cache.rs: fresh entry? → cached data
//!     → breaker open / locks.rs held? → stale cache or static fallback
//!     → locks.rs acquire → RetryingInvoker → provider
//!     → success: cache.rs write (timestamp, content hash) → data
//!     → failure: stale cache or static fallback
//!
//! feature call (chat, image)
//!     → RetryingInvoker → provider → data, or static fallback
//! ```
//!
//! # Design Decisions
//! - Every public feature returns a `Served<T>`; errors never leave the gateway
//! - One `Gateway` instance owns the breaker and the lock map, shared by `Arc`
//! - Lock release is tied to a guard, so cancellation and panics release it too

pub mod assist;
pub mod cache;
pub mod echoes;
pub mod generation;
pub mod locks;
pub mod summary;
pub mod types;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{GatewayConfig, ProviderConfig, ResilienceConfig};
use crate::observability::metrics;
use crate::provider::{GenerationRequest, GenerationResponse, GenerativeProvider};
use crate::resilience::{CircuitBreaker, RetryingInvoker};
use crate::storage::KvStore;

pub use cache::{content_hash, CacheEntry, TtlCache};
pub use generation::{Generation, GenerationTracker};
pub use locks::{CallGuard, CallLocks};
pub use types::{Degraded, FeatureKey, GatewayError, Served, ServedFrom};

/// Shared mutable state of the gateway: the lockout deadline and the call locks.
#[derive(Debug)]
pub struct GatewayState {
    pub breaker: CircuitBreaker,
    pub locks: CallLocks,
}

/// Snapshot of one feature cache for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub feature: FeatureKey,
    pub age_ms: Option<u64>,
    pub ttl_ms: u64,
    pub call_in_flight: bool,
}

/// Snapshot of the gateway for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub breaker_open: bool,
    pub lockout_until_ms: u64,
    pub remaining_ms: u64,
    pub caches: Vec<CacheStatus>,
}

pub struct Gateway<P> {
    provider: P,
    state: GatewayState,
    invoker: RetryingInvoker,
    cache: TtlCache,
    generations: GenerationTracker,
    clock: Arc<dyn Clock>,
    provider_config: ProviderConfig,
}

impl<P: GenerativeProvider> Gateway<P> {
    pub fn new(
        provider: P,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        config: &GatewayConfig,
    ) -> Self {
        let breaker = CircuitBreaker::new(store.clone(), clock.clone());
        let invoker = RetryingInvoker::new(breaker.clone(), config.resilience.clone());
        let cache = TtlCache::new(store, clock.clone(), config.cache.clone());

        Self {
            provider,
            state: GatewayState {
                breaker,
                locks: CallLocks::new(),
            },
            invoker,
            cache,
            generations: GenerationTracker::new(),
            clock,
            provider_config: config.provider.clone(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    pub fn generations(&self) -> &GenerationTracker {
        &self.generations
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn policy(&self) -> &ResilienceConfig {
        self.invoker.policy()
    }

    pub fn status(&self) -> GatewayStatus {
        let breaker = &self.state.breaker;
        let caches = [FeatureKey::FeedSummary, FeatureKey::GlobalEchoes]
            .into_iter()
            .map(|feature| CacheStatus {
                feature,
                age_ms: self.cache.age_ms(feature),
                ttl_ms: self.cache.ttl_ms(feature),
                call_in_flight: self.state.locks.is_held(feature),
            })
            .collect();

        let breaker_open = breaker.is_open();
        metrics::record_breaker_open(breaker_open);

        GatewayStatus {
            breaker_open,
            lockout_until_ms: breaker.lockout_until(),
            remaining_ms: breaker.remaining().as_millis() as u64,
            caches,
        }
    }

    /// One remote call through the invoker with the given retry budget.
    async fn call(
        &self,
        feature: &'static str,
        max_retries: u32,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GatewayError> {
        let result = self
            .invoker
            .invoke(max_retries, || self.provider.generate(request.clone()))
            .await;
        metrics::record_remote_call(feature, result.is_ok());
        result
    }

    /// Cached, coalesced fetch shared by the summary and echo features.
    async fn fetch_cached<T, Parse>(
        &self,
        feature: FeatureKey,
        input_hash: Option<String>,
        request: GenerationRequest,
        parse: Parse,
        blocked_fallback: fn() -> T,
        failed_fallback: fn() -> T,
    ) -> Served<T>
    where
        T: Serialize + DeserializeOwned + Send,
        Parse: FnOnce(GenerationResponse) -> Result<T, GatewayError> + Send,
    {
        let cached: Option<CacheEntry<T>> = self.cache.get(feature);

        if let Some(entry) = cached.as_ref() {
            if self.cache.is_fresh(feature, entry, input_hash.as_deref()) {
                return self.served(feature, cached.map(|e| e.data), ServedFrom::Cache, blocked_fallback);
            }
        }

        if self.state.breaker.is_open() {
            tracing::debug!(feature = %feature, "Circuit open, serving last known data");
            return self.degrade(feature, cached, Degraded::CircuitOpen, blocked_fallback);
        }

        let Some(_guard) = self.state.locks.try_acquire(feature) else {
            tracing::debug!(feature = %feature, "Call already in flight, serving last known data");
            return self.degrade(feature, cached, Degraded::CallInFlight, blocked_fallback);
        };

        let result = self
            .call(feature.as_str(), self.policy().default_max_retries, request)
            .await
            .and_then(parse);

        match result {
            Ok(data) => {
                if let Err(e) = self.cache.put(feature, &data, input_hash) {
                    tracing::warn!(feature = %feature, error = %e, "Failed to persist cache entry");
                }
                self.served(feature, Some(data), ServedFrom::Remote, failed_fallback)
            }
            Err(e) => {
                tracing::debug!(feature = %feature, error = %e, "Remote call failed, degrading");
                self.degrade(feature, cached, degraded_for(e), failed_fallback)
            }
        }
    }

    fn degrade<T>(
        &self,
        feature: FeatureKey,
        cached: Option<CacheEntry<T>>,
        reason: Degraded,
        fallback: fn() -> T,
    ) -> Served<T> {
        match cached {
            Some(entry) => self.served(feature, Some(entry.data), ServedFrom::StaleCache(reason), fallback),
            None => self.served(feature, None, ServedFrom::Fallback(reason), fallback),
        }
    }

    fn served<T>(&self, feature: FeatureKey, data: Option<T>, source: ServedFrom, fallback: fn() -> T) -> Served<T> {
        metrics::record_served(feature.as_str(), source.label());
        Served::new(data.unwrap_or_else(fallback), source)
    }
}

pub(crate) fn degraded_for(error: GatewayError) -> Degraded {
    match error {
        GatewayError::Cooldown { .. } => Degraded::CircuitOpen,
        other => Degraded::Failed(other),
    }
}
