//! HTTP gateway for chatrelay.
//!
//! Exposes the history and chat endpoints consumed by the browser frontend,
//! plus a liveness check.
//!
//! Built on Axum.

pub mod api;
pub mod cors;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::info;

use chatrelay_agent::ConversationAssembler;
use chatrelay_config::{AppConfig, GatewayConfig};
use chatrelay_core::history::HistoryStore;

/// Shared application state for the gateway.
pub struct AppState {
    pub assembler: Arc<ConversationAssembler>,
    pub store: Arc<dyn HistoryStore>,
}

impl AppState {
    /// Both handles point at the same store.
    pub fn new(assembler: ConversationAssembler) -> Self {
        let store = assembler.store().clone();
        Self {
            assembler: Arc::new(assembler),
            store,
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - CORS from `gateway.allowed_origins` and `gateway.allow_origin_regex`
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    Router::new()
        .route("/ping", get(api::ping_handler))
        .route(
            "/api/history",
            get(api::get_history_handler).delete(api::clear_history_handler),
        )
        .route("/api/chat", post(api::chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors::cors_layer(gateway))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// The store and provider are built once here and shared by every request.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let store = chatrelay_history::build_from_config(&config.history);
    let provider = chatrelay_providers::build_from_config(&config)?;
    let assembler = ConversationAssembler::from_config(&config, store.clone(), provider.clone());

    info!(
        store = store.name(),
        max_history = store.max_length(),
        provider = provider.name(),
        model = assembler.model(),
        "Conversation pipeline ready"
    );

    let app = build_router(Arc::new(AppState::new(assembler)), &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
