//! Axum router configuration with middleware.
//!
//! Routes mirror the public surface of the deployer: bot lifecycle at the
//! top level, per-bot chat and history under `/bot/{name}/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/create_bot", post(handlers::bot::create_bot))
        .route("/deploy_bot", post(handlers::bot::deploy_bot))
        .route("/bots", get(handlers::bot::list_bots))
        .route("/bot/{name}/chat", post(handlers::chat::chat))
        .route("/bot/{name}/history", get(handlers::chat::history))
        .route("/health", get(handlers::bot::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
