use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::domain::{ChatMessage, DomainError};

/// Lazy, finite, non-restartable sequence of text deltas from a provider.
///
/// `Ok(None)` marks an event that carried no text (a role announcement or a
/// finish marker). The first `Err` ends the completion.
pub type TextDeltaStream = Pin<Box<dyn Stream<Item = Result<Option<String>, DomainError>> + Send>>;

/// A hosted chat-completion service that streams its reply.
///
/// Implementors own transport, authentication, and the vendor's event format;
/// the relay only sees ordered optional text fragments.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Start a streamed completion for `messages`, which already carry the
    /// system instruction in first position.
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<TextDeltaStream, DomainError>;

    /// Model identifier requested from the provider.
    fn model(&self) -> &str;
}
