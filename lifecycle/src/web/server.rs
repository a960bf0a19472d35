use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub async fn start_web_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_health))
        // === CLUSTER ROUTES ===
        .route("/api/cluster", get(handlers::get_cluster_state))
        .route("/api/cluster/reconcile", post(handlers::trigger_reconcile))
        // === OPERATION ROUTES ===
        .route("/api/operations/active", get(handlers::get_active_operations))
        .route("/api/schedule", get(handlers::get_schedule))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
