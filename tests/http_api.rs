//! HTTP API against a mock generative service.

use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nexus_gateway::config::GatewayConfig;
use nexus_gateway::http::HttpServer;
use nexus_gateway::lifecycle::Shutdown;
use nexus_gateway::provider::GeminiProvider;
use nexus_gateway::storage::MemoryStore;

mod common;

const ADMIN_KEY: &str = "test-admin-key-0123456789";

async fn start_gateway(backend: SocketAddr, tweak: impl FnOnce(&mut GatewayConfig)) -> (String, Shutdown) {
    let mut config = GatewayConfig::default();
    config.provider.base_url = format!("http://{}", backend);
    config.resilience.base_delay_ms = 10;
    config.resilience.jitter_ms = 5;
    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.to_string();
    tweak(&mut config);

    let provider = GeminiProvider::new(&config.provider, "test-key".to_string()).unwrap();
    let server = HttpServer::new(config, provider, Arc::new(MemoryStore::new()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (format!("http://{}", addr), shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_health_carries_request_id() {
    let backend = common::start_programmable_backend(|_, _| (200, common::gemini_text("ok"))).await;
    let (base, shutdown) = start_gateway(backend, |_| {}).await;

    let res = client().get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().get("x-request-id").is_some());

    let res = client()
        .get(format!("{}/health", base))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");

    shutdown.trigger();
}

#[tokio::test]
async fn test_summary_then_cache() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let backend = common::start_programmable_backend(move |path, body| {
        cc.fetch_add(1, Ordering::SeqCst);
        assert!(path.ends_with(":generateContent"));
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
        assert!(prompt.contains("kai: signal"));
        (200, common::gemini_text("• quiet hum"))
    })
    .await;
    let (base, shutdown) = start_gateway(backend, |_| {}).await;
    let body = json!({ "posts": [common::post("p1", "kai", "signal")] });

    let first: Value = client()
        .post(format!("{}/ai/summary", base))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["summary"], "• quiet hum");
    assert_eq!(first["source"], "remote");

    let second: Value = client()
        .post(format!("{}/ai/summary", base))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["source"], "cache");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_quota_errors_open_the_circuit() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let backend = common::start_programmable_backend(move |_, _| {
        cc.fetch_add(1, Ordering::SeqCst);
        common::gemini_quota_error()
    })
    .await;
    let (base, shutdown) = start_gateway(backend, |_| {}).await;

    let echoes: Value = client()
        .get(format!("{}/ai/echoes", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echoes["source"], "fallback");
    assert_eq!(echoes["posts"][0]["id"], "fallback-1");
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let chat: Value = client()
        .post(format!("{}/ai/chat", base))
        .json(&json!({ "conversationId": "c1", "history": [{ "role": "user", "text": "hi" }] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chat["reply"], "Local node synchronization optimal. Transmit again in a moment.");
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let status: Value = client()
        .get(format!("{}/admin/gateway", base))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["breaker_open"], true);
    assert!(status["remaining_ms"].as_u64().unwrap() > 40_000);

    shutdown.trigger();
}

#[tokio::test]
async fn test_chat_and_image() {
    let backend = common::start_programmable_backend(|_, body| {
        if body["generationConfig"]["imageConfig"]["aspectRatio"] == "1:1" {
            (200, common::gemini_image("image/png", "iVBOR"))
        } else {
            (200, common::gemini_text("welcome to the nexus"))
        }
    })
    .await;
    let (base, shutdown) = start_gateway(backend, |_| {}).await;

    let chat: Value = client()
        .post(format!("{}/ai/chat", base))
        .json(&json!({ "conversationId": "c1", "history": [{ "role": "user", "text": "hello" }] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chat["reply"], "welcome to the nexus");
    assert_eq!(chat["source"], "remote");

    let image: Value = client()
        .post(format!("{}/ai/image", base))
        .json(&json!({ "prompt": "glass city" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(image["image"], "data:image/png;base64,iVBOR");

    let empty = client()
        .post(format!("{}/ai/chat", base))
        .json(&json!({ "conversationId": "c1", "history": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), 400);

    shutdown.trigger();
}

#[tokio::test]
async fn test_stories_round_trip() {
    let backend = common::start_programmable_backend(|_, _| (200, common::gemini_text(""))).await;
    let (base, shutdown) = start_gateway(backend, |_| {}).await;

    let res = client()
        .post(format!("{}/stories/mira", base))
        .json(&json!({
            "authorName": "Mira",
            "authorAvatar": "https://example.org/mira.png",
            "drafts": [{ "text": "first light" }, { "text": "" }, { "text": "second wind" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created.as_array().unwrap().len(), 2);
    assert_eq!(created[1]["rank"], 1);

    let listed: Value = client()
        .get(format!("{}/stories/mira", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed[0]["text"], "first light");
    assert_eq!(listed[1]["text"], "second wind");
    assert_eq!(listed[0]["ownerId"], "mira");

    let rejected = client()
        .post(format!("{}/stories/mira", base))
        .json(&json!({ "authorName": "Mira", "drafts": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 400);

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_requires_key() {
    let backend = common::start_programmable_backend(|_, _| (200, common::gemini_text(""))).await;
    let (base, shutdown) = start_gateway(backend, |_| {}).await;

    let res = client().get(format!("{}/admin/status", base)).send().await.unwrap();
    assert_eq!(res.status(), 401);

    let res = client()
        .get(format!("{}/admin/status", base))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let status: Value = res.json().await.unwrap();
    assert_eq!(status["status"], "operational");

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_disabled_is_not_routed() {
    let backend = common::start_programmable_backend(|_, _| (200, common::gemini_text(""))).await;
    let (base, shutdown) = start_gateway(backend, |c| c.admin.enabled = false).await;

    let res = client()
        .get(format!("{}/admin/status", base))
        .bearer_auth(ADMIN_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(10)).await;
}
