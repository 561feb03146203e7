use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::CounterpointError;
use crate::gateway::CompletionGateway;
use crate::models::Turn;
use crate::styles::DebateStyle;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CompletionGateway>,
}

/// Body of `POST /api/debate`. Turn roles are coerced into {user, assistant}
/// during deserialization; an unknown style falls back to neutral.
#[derive(Debug, Deserialize)]
pub struct DebateBody {
    pub messages: Vec<Turn>,
    #[serde(default)]
    pub style: DebateStyle,
}

// Success contract the UI depends on: content[0].text
#[derive(Debug, Serialize)]
pub struct ReplyBody {
    pub content: Vec<ReplyBlock>,
}

#[derive(Debug, Serialize)]
pub struct ReplyBlock {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/debate", post(debate))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn debate(State(state): State<AppState>, Json(body): Json<DebateBody>) -> Response {
    if body.messages.is_empty() {
        return error_response(CounterpointError::validation(
            "messages",
            "messages cannot be empty",
        ));
    }

    match state.gateway.complete(&body.messages, body.style).await {
        Ok(turn) => (
            StatusCode::OK,
            Json(ReplyBody {
                content: vec![ReplyBlock { text: turn.content }],
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Map gateway failures to the structured error contract. Upstream
/// diagnostics ride along in `details`; nothing propagates as an unhandled
/// fault.
fn error_response(err: CounterpointError) -> Response {
    let (status, details) = match &err {
        CounterpointError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, None),
        CounterpointError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        CounterpointError::Network(_) => (StatusCode::BAD_GATEWAY, None),
        CounterpointError::Api { body, .. } => {
            let details = serde_json::from_str(body)
                .unwrap_or_else(|_| serde_json::Value::String(body.clone()));
            (StatusCode::BAD_GATEWAY, Some(details))
        }
        CounterpointError::Malformed { raw, .. } => (StatusCode::BAD_GATEWAY, Some(raw.clone())),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    tracing::error!(status = status.as_u16(), "debate request failed: {err}");

    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
            details,
        }),
    )
        .into_response()
}
