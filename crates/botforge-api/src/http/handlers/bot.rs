//! Bot lifecycle handlers: create, deploy, list, health.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use botforge_core::registry::DeployOutcome;
use botforge_types::bot::{CreateBotRequest, DeployBotRequest};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /create_bot - Create and register a new bot.
///
/// The memory-server upload outcome is reported in the payload; an
/// unreachable store never fails the creation.
pub async fn create_bot(
    State(state): State<AppState>,
    Json(body): Json<CreateBotRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let (agent, outcome) = state.registry.create(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::json!({
        "created": agent.config().name,
        "saved_to_memory": outcome.ok,
        "memory_resp": outcome.detail,
    });

    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}

/// POST /deploy_bot - Deploy a bot from its config on the memory server.
///
/// Deploying an already-registered name is an idempotent success.
pub async fn deploy_bot(
    State(state): State<AppState>,
    Json(body): Json<DeployBotRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let outcome = state.registry.deploy(&body.name).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = match outcome {
        DeployOutcome::Deployed(agent) => serde_json::json!({
            "deployed": agent.config().name,
        }),
        DeployOutcome::AlreadyDeployed(agent) => serde_json::json!({
            "status": "already_deployed",
            "name": agent.config().name,
        }),
    };

    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}

/// GET /bots - List registered bot names.
pub async fn list_bots(
    State(state): State<AppState>,
) -> Json<ApiResponse<serde_json::Value>> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let data = serde_json::json!({ "bots": state.registry.list() });
    let elapsed = start.elapsed().as_millis() as u64;

    Json(ApiResponse::success(data, request_id, elapsed))
}

/// GET /health - Service status, deployed names, store endpoint, and
/// generator availability.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "bots": state.registry.list(),
        "memory": state.config.memory_url,
        "generator": state.registry.generator_availability(),
    }))
}
