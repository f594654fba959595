//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the public API and the admin API
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Serve until the shutdown signal, then drain

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::clock::{Clock, SystemClock};
use crate::config::GatewayConfig;
use crate::gateway::Gateway;
use crate::http::handlers;
use crate::http::middleware::metrics::track_metrics;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::provider::GeminiProvider;
use crate::storage::KvStore;
use crate::stories::EphemeralStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway<GeminiProvider>>,
    pub stories: EphemeralStore,
    pub config: Arc<GatewayConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        provider: GeminiProvider,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gateway = Gateway::new(provider, store.clone(), clock.clone(), &config);
        let stories = EphemeralStore::new(store, clock, config.stories.clone());
        Self {
            gateway: Arc::new(gateway),
            stories,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the gateway API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: GatewayConfig, provider: GeminiProvider, store: Arc<dyn KvStore>) -> Self {
        Self::with_state(AppState::new(config, provider, store, Arc::new(SystemClock)))
    }

    pub fn with_state(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();

        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/ai/summary", post(handlers::summary))
            .route("/ai/pulse", post(handlers::pulse))
            .route("/ai/echoes", get(handlers::echoes))
            .route("/ai/chat", post(handlers::chat))
            .route("/ai/chat/{conversation_id}", delete(handlers::end_chat))
            .route("/ai/image", post(handlers::image))
            .route(
                "/stories/{owner}",
                get(handlers::list_stories).post(handlers::post_stories),
            )
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(setup_admin_router(state));
        }

        // Outermost first
        router.layer(middleware::from_fn(track_metrics)).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(propagate_request_id_layer())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                .layer(DefaultBodyLimit::disable())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
