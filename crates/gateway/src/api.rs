//! Request handlers for `/ping` and `/api/*`.
//!
//! Failures are logged with full detail and answered with a fixed message,
//! so storage and provider errors look the same to the client.

use axum::{Json, extract::State, http::StatusCode};
use chatrelay_core::message::History;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use crate::SharedState;

const CLEAR_FAILED: &str = "Failed to clear history";
const CHAT_FAILED: &str = "Failed to get a response from the assistant";

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub messages: History,
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response_text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(message: &'static str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
}

pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

/// `GET /api/history`
pub async fn get_history_handler(State(state): State<SharedState>) -> Json<HistoryResponse> {
    let messages = state.store.load().await;
    Json(HistoryResponse { messages })
}

/// `DELETE /api/history`
pub async fn clear_history_handler(
    State(state): State<SharedState>,
) -> Result<Json<ClearResponse>, ApiError> {
    if state.store.clear().await {
        info!("History cleared");
        Ok(Json(ClearResponse {
            message: "History cleared",
        }))
    } else {
        // The store already logged the underlying write error.
        Err(internal_error(CLEAR_FAILED))
    }
}

/// `POST /api/chat`
pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    match state.assembler.handle_user_turn(&payload.text).await {
        Ok(reply) => Ok(Json(ChatResponse {
            response_text: reply.text,
            timestamp: reply.timestamp,
        })),
        Err(e) => {
            error!(error = %e, "Chat turn failed");
            Err(internal_error(CHAT_FAILED))
        }
    }
}
