//! Chat turn and history handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use botforge_types::bot::ChatRequest;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /bot/{name}/chat - Run one chat turn against a deployed bot.
///
/// Always returns a reply for a deployed bot: generator trouble degrades
/// to the fixed fallback string rather than an error.
pub async fn chat(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let reply = state.registry.chat(&name, &body.message).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::json!({ "reply": reply });
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}

/// GET /bot/{name}/history - Ordered history snapshot for a deployed bot.
pub async fn history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let entries = state.registry.history(&name).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let data = serde_json::json!({ "history": entries });
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}
