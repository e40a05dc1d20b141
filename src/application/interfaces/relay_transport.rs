use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::domain::{DomainError, Message};

/// Raw reply bytes as they arrive from the relay.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Client-side link to the relay endpoint.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Post the conversation history and return the streamed reply body.
    async fn send(&self, history: &[Message]) -> Result<ByteStream, DomainError>;
}
