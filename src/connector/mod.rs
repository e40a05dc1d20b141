//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion providers (OpenAI-compatible streaming, scripted mock)
//! - Relay transport and terminal view for the chat client
//! - The relay's HTTP surface and the CLI container/controllers

pub mod adapter;
pub mod api;
pub mod http;

pub use adapter::*;
