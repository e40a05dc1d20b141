use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::{CompletionProvider, TextDeltaStream};
use crate::domain::{ChatMessage, DomainError};

const MOCK_MODEL: &str = "mock-completion";
const DEMO_REPLY: &str =
    "Thanks for reaching out! This is a canned reply from the offline support relay.";

/// In-memory [`CompletionProvider`] that plays back a fixed script of deltas.
///
/// Every request is recorded so callers can inspect exactly what would have
/// been sent upstream.
pub struct ScriptedCompletionProvider {
    script: Vec<Option<String>>,
    fail_after: Option<usize>,
    unavailable: Option<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletionProvider {
    pub fn new(script: Vec<Option<String>>) -> Self {
        Self {
            script,
            fail_after: None,
            unavailable: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Canned word-by-word reply, used when the relay runs without a provider.
    pub fn demo() -> Self {
        let words: Vec<&str> = DEMO_REPLY.split(' ').collect();
        let script = words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                if i == 0 {
                    Some(word.to_string())
                } else {
                    Some(format!(" {word}"))
                }
            })
            .collect();
        Self::new(script).with_delay(Duration::from_millis(40))
    }

    /// A provider whose completions cannot be opened at all.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.unavailable = Some(reason.into());
        provider
    }

    /// Fail with a provider error after `events` scripted events.
    pub fn failing_after(mut self, events: usize) -> Self {
        self.fail_after = Some(events);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Message lists received so far, oldest first.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletionProvider {
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<TextDeltaStream, DomainError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages);
        }

        if let Some(reason) = &self.unavailable {
            return Err(DomainError::provider(reason.clone()));
        }

        let script = self.script.clone();
        let fail_after = self.fail_after;
        let delay = self.delay;
        debug!("Playing back {} scripted event(s)", script.len());

        Ok(Box::pin(async_stream::stream! {
            for (i, delta) in script.into_iter().enumerate() {
                if fail_after == Some(i) {
                    yield Err(DomainError::provider("scripted failure"));
                    return;
                }
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(delta);
            }
            if fail_after.is_some() {
                yield Err(DomainError::provider("scripted failure"));
            }
        }))
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }
}
