mod handlers;
mod state;

use axum::routing::{delete, get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Settings;
use crate::delivery::SessionRegistry;
use crate::distance::DistanceProvider;

pub fn build_router(settings: Settings, provider: Arc<dyn DistanceProvider>) -> Router {
    let sessions = SessionRegistry::new(provider, settings.fallback_zone.to_zone())
        .with_idle_ttl(settings.session_idle_ttl());
    let state = Arc::new(AppState { settings, sessions });

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/quote", post(handlers::quote))
        .route("/api/zones", get(handlers::zones))
        .route("/api/sessions/reset", post(handlers::reset_sessions))
        .route("/api/sessions/{id}", delete(handlers::close_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(
    host: &str,
    port: u16,
    settings: Settings,
    provider: Arc<dyn DistanceProvider>,
) -> std::io::Result<()> {
    let app = build_router(settings, provider);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "deliverable server listening");
    eprintln!("  deliverable server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
