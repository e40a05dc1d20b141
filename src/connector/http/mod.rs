//! HTTP surface of the relay (axum).

pub mod app;
pub mod handlers;
pub mod state;

pub use app::{create_app, CHAT_PATH, HEALTH_PATH};
pub use state::HttpState;
