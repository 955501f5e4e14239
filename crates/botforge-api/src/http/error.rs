//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use botforge_types::error::{BotError, HistoryError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Registry and agent errors.
    Bot(BotError),
    /// Generic internal error.
    Internal(String),
}

impl From<BotError> for AppError {
    fn from(e: BotError) -> Self {
        AppError::Bot(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Bot(BotError::InvalidName(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Bot(err @ BotError::InvalidMessage) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            AppError::Bot(err @ BotError::InvalidConfig(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            AppError::Bot(err @ BotError::AlreadyExists(_)) => {
                (StatusCode::CONFLICT, "BOT_EXISTS", err.to_string())
            }
            AppError::Bot(BotError::NotFound) => {
                (StatusCode::NOT_FOUND, "BOT_NOT_FOUND", "Bot not deployed".to_string())
            }
            AppError::Bot(err @ BotError::ConfigNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "CONFIG_NOT_FOUND", err.to_string())
            }
            AppError::Bot(BotError::History(err @ HistoryError::Corrupt { .. })) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "HISTORY_CORRUPT", err.to_string())
            }
            AppError::Bot(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "BOT_ERROR", e.to_string())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}
