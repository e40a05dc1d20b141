use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::application::CompletionProvider;
use crate::domain::{ChatMessage, DomainError, Role, SystemInstruction};

/// Reply bytes forwarded to the relay's caller.
pub type RelayByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Forwards a conversation to the completion provider behind a fixed system
/// instruction and relays the generated text back as raw bytes.
pub struct RelayChatUseCase {
    provider: Arc<dyn CompletionProvider>,
    instruction: SystemInstruction,
}

impl RelayChatUseCase {
    pub fn new(provider: Arc<dyn CompletionProvider>, instruction: SystemInstruction) -> Self {
        Self {
            provider,
            instruction,
        }
    }

    pub fn instruction(&self) -> &SystemInstruction {
        &self.instruction
    }

    /// Build the provider request: the relay's instruction followed by the
    /// caller's turns. Caller-supplied system turns are discarded so exactly
    /// one instruction is ever sent.
    pub fn provider_messages(&self, history: Vec<ChatMessage>) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(self.instruction.to_message());

        let mut dropped = 0usize;
        for message in history {
            if message.role == Role::System {
                dropped += 1;
                continue;
            }
            messages.push(message);
        }

        if dropped > 0 {
            warn!("Discarded {} client-supplied system message(s)", dropped);
        }

        messages
    }

    /// Open a streamed completion and return the relayed byte stream.
    ///
    /// Fragments are forwarded in arrival order; events without text are
    /// skipped. A provider failure is yielded once and ends the stream.
    pub async fn execute(&self, history: Vec<ChatMessage>) -> Result<RelayByteStream, DomainError> {
        let messages = self.provider_messages(history);
        info!(
            "Relaying {} message(s) to model {}",
            messages.len() - 1,
            self.provider.model()
        );

        let mut deltas = self.provider.stream_completion(messages).await?;

        let stream = async_stream::stream! {
            let mut forwarded = 0usize;
            while let Some(item) = deltas.next().await {
                match item {
                    Ok(Some(text)) if !text.is_empty() => {
                        forwarded += 1;
                        yield Ok(Bytes::from(text));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Provider stream failed after {} fragment(s): {}", forwarded, e);
                        yield Err(e);
                        return;
                    }
                }
            }
            debug!("Provider stream finished after {} fragment(s)", forwarded);
        };

        Ok(Box::pin(stream))
    }
}
