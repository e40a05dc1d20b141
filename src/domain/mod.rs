//! # Domain Layer
//!
//! Chat messages, conversations, and the relay's fixed system instruction.
//! This layer is independent of HTTP, providers, and terminal I/O.

pub mod error;
pub mod models;
pub mod services;

pub use error::*;
pub use models::*;
pub use services::*;
