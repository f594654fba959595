//! Gateway behaviour under rate limiting, concurrency and restarts.

use std::sync::Arc;
use std::time::Duration;

use nexus_gateway::clock::ManualClock;
use nexus_gateway::config::GatewayConfig;
use nexus_gateway::feed::Post;
use nexus_gateway::gateway::summary::{AURA_FLUCTUATING, PULSE_STEADY, VOID_PLACEHOLDER};
use nexus_gateway::gateway::{Degraded, FeatureKey, Gateway, ServedFrom};
use nexus_gateway::provider::{GenerationResponse, ProviderError};
use nexus_gateway::storage::{FileStore, KvStore, MemoryStore, LOCKOUT_KEY};

mod common;
use common::ScriptedProvider;

const START_MS: u64 = 1_700_000_000_000;

fn posts(ids: &[&str]) -> Vec<Post> {
    ids.iter()
        .map(|id| serde_json::from_value(common::post(id, "kai", "signal")).unwrap())
        .collect()
}

fn gateway_with(
    provider: ScriptedProvider,
    store: Arc<dyn KvStore>,
) -> (Arc<Gateway<ScriptedProvider>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    let gateway = Gateway::new(provider, store, clock.clone(), &GatewayConfig::default());
    (Arc::new(gateway), clock)
}

#[tokio::test(start_paused = true)]
async fn test_persistent_rate_limit_trips_breaker() {
    let provider = ScriptedProvider::new().otherwise(Err(ProviderError::rate_limited()));
    let (gateway, _clock) = gateway_with(provider, Arc::new(MemoryStore::new()));

    let served = gateway.summarize_feed(&posts(&["p1"])).await;

    assert_eq!(served.data, AURA_FLUCTUATING);
    assert!(matches!(served.source, ServedFrom::Fallback(Degraded::Failed(_))));
    assert_eq!(gateway.provider().calls(), 3);
    assert_eq!(gateway.state().breaker.lockout_until(), START_MS + 45_000);

    // Every feature now fails fast without touching the provider
    let echoes = gateway.global_echoes().await;
    assert!(matches!(echoes.source, ServedFrom::Fallback(Degraded::CircuitOpen)));
    assert_eq!(gateway.provider().calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_breaker_closes_after_deadline() {
    let provider = ScriptedProvider::new()
        .then(Err(ProviderError::rate_limited()))
        .then(Err(ProviderError::rate_limited()))
        .then(Err(ProviderError::rate_limited()))
        .then(Ok(GenerationResponse::text("back online")));
    let (gateway, clock) = gateway_with(provider, Arc::new(MemoryStore::new()));

    gateway.summarize_feed(&posts(&["p1"])).await;
    clock.advance(Duration::from_millis(44_999));
    assert!(gateway.state().breaker.is_open());

    clock.advance(Duration::from_millis(1));
    let served = gateway.summarize_feed(&posts(&["p1"])).await;
    assert!(served.is_remote());
    assert_eq!(served.data, "back online");
}

#[tokio::test]
async fn test_simultaneous_fetches_make_one_call() {
    let provider = ScriptedProvider::new()
        .then(Ok(GenerationResponse::text("one summary")))
        .with_delay(Duration::from_millis(50));
    let (gateway, _clock) = gateway_with(provider, Arc::new(MemoryStore::new()));
    let feed = posts(&["p1", "p2"]);

    let (first, second) = tokio::join!(gateway.summarize_feed(&feed), gateway.summarize_feed(&feed));

    assert_eq!(gateway.provider().calls(), 1);
    assert!(first.is_remote());
    assert_eq!(second.data, PULSE_STEADY);
    assert!(matches!(second.source, ServedFrom::Fallback(Degraded::CallInFlight)));

    // Once the first call landed, the cache answers
    let third = gateway.summarize_feed(&feed).await;
    assert!(matches!(third.source, ServedFrom::Cache));
    assert_eq!(third.data, "one summary");
}

#[tokio::test]
async fn test_lock_released_after_failure() {
    let provider = ScriptedProvider::new()
        .then(Err(ProviderError::with_status(500, "boom")))
        .then(Ok(GenerationResponse::text("recovered")));
    let (gateway, _clock) = gateway_with(provider, Arc::new(MemoryStore::new()));

    let failed = gateway.summarize_feed(&posts(&["p1"])).await;
    assert_eq!(failed.data, AURA_FLUCTUATING);
    assert!(!gateway.state().locks.is_held(FeatureKey::FeedSummary));

    let retried = gateway.summarize_feed(&posts(&["p1"])).await;
    assert!(retried.is_remote());
    assert_eq!(gateway.provider().calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_call_releases_lock() {
    let provider = ScriptedProvider::new()
        .otherwise(Ok(GenerationResponse::text("slow")))
        .with_delay(Duration::from_secs(30));
    let (gateway, _clock) = gateway_with(provider, Arc::new(MemoryStore::new()));
    let feed = posts(&["p1"]);

    let timed_out =
        tokio::time::timeout(Duration::from_secs(1), gateway.summarize_feed(&feed)).await;
    assert!(timed_out.is_err());
    assert!(!gateway.state().locks.is_held(FeatureKey::FeedSummary));
}

#[tokio::test]
async fn test_empty_feed_touches_nothing() {
    let store = Arc::new(MemoryStore::new());
    let (gateway, _clock) = gateway_with(ScriptedProvider::new(), store.clone());

    let served = gateway.summarize_feed(&[]).await;

    assert_eq!(served.data, VOID_PLACEHOLDER);
    assert_eq!(gateway.provider().calls(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_stale_cache_preferred_over_fallback_when_open() {
    let provider = ScriptedProvider::new().then(Ok(GenerationResponse::text("[]")));
    let (gateway, clock) = gateway_with(provider, Arc::new(MemoryStore::new()));

    let first = gateway.global_echoes().await;
    assert!(first.is_remote());

    clock.advance(Duration::from_secs(2 * 60 * 60));
    gateway.state().breaker.trip(Duration::from_secs(45));

    let served = gateway.global_echoes().await;
    assert!(matches!(served.source, ServedFrom::StaleCache(Degraded::CircuitOpen)));
    assert!(served.data.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_lockout_and_cache_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.json");

    {
        let provider = ScriptedProvider::new()
            .then(Ok(GenerationResponse::text("persisted")))
            .otherwise(Err(ProviderError::rate_limited()));
        let (gateway, _clock) = gateway_with(provider, Arc::new(FileStore::open(&path)));
        gateway.summarize_feed(&posts(&["p1"])).await;
        gateway.global_echoes().await;
        assert!(gateway.state().breaker.is_open());
    }

    let store = Arc::new(FileStore::open(&path));
    assert_eq!(store.get(LOCKOUT_KEY), Some((START_MS + 45_000).to_string()));

    let (gateway, _clock) = gateway_with(ScriptedProvider::new(), store);
    assert!(gateway.state().breaker.is_open());

    let served = gateway.summarize_feed(&posts(&["p1"])).await;
    assert!(matches!(served.source, ServedFrom::Cache));
    assert_eq!(served.data, "persisted");
    assert_eq!(gateway.provider().calls(), 0);
}
