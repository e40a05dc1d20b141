//! # Application Layer
//!
//! Interfaces to providers, transports and views, plus the relay and chat
//! session use cases that coordinate them.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
