use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers::{health_handler, relay_handler};
use super::state::HttpState;

pub const CHAT_PATH: &str = "/api/chat";
pub const HEALTH_PATH: &str = "/health";

/// Build the relay's HTTP application.
pub fn create_app(state: HttpState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .route(CHAT_PATH, post(relay_handler))
        .layer(trace_layer)
        .with_state(state)
}
