use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use crate::domain::ChatMessage;

use super::state::HttpState;

const MAX_LOGGED_CHARS: usize = 80;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "healthy" }))
}

/// `POST /api/chat`: relay the posted history and stream the reply as plain
/// UTF-8 text.
///
/// Once streaming has started a provider failure aborts the body, so the
/// caller sees a transport fault instead of a silently truncated reply.
pub async fn relay_handler(
    State(state): State<HttpState>,
    Json(history): Json<Vec<ChatMessage>>,
) -> Response {
    if let Some(last) = history.last() {
        debug!(
            "Relay request with {} message(s), last {}: {}",
            history.len(),
            last.role,
            preview(&last.content)
        );
    }

    match state.relay.execute(history).await {
        Ok(stream) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to open completion stream: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                format!("Completion provider unavailable: {e}"),
            )
                .into_response()
        }
    }
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_LOGGED_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(MAX_LOGGED_CHARS).collect();
    format!("{head}... ({} chars total)", trimmed.chars().count())
}
