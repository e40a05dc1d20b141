use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::{ChatObserver, Clock, NoopObserver, RelayTransport};
use crate::domain::{Conversation, DomainError, Message, MessageId, Utf8StreamDecoder};

/// Assistant message appended when a submission fails.
pub const FALLBACK_REPLY: &str = "I'm sorry, but I encountered an error. Please try again later.";

/// Where a session is in its request/stream cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Placeholder inserted, waiting for the relay to answer.
    Sending,
    /// Reply bytes are arriving.
    Streaming,
}

impl SessionState {
    /// Whether the send control should be enabled.
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was appended or sent.
    Ignored,
    /// Another submission is in flight; nothing was appended or sent.
    Busy,
    Completed { reply: MessageId },
    /// The fallback message was appended. `reply` still holds any partial text.
    Failed { reply: MessageId },
}

/// Client side of the chat: owns the conversation and drives one
/// request/stream cycle per submission.
pub struct ChatSession {
    transport: Arc<dyn RelayTransport>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn ChatObserver>,
    conversation: Mutex<Conversation>,
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// Start a session seeded with the assistant greeting.
    pub fn new(transport: Arc<dyn RelayTransport>, clock: Arc<dyn Clock>) -> Self {
        let conversation = Conversation::with_greeting(clock.now());
        Self {
            transport,
            clock,
            observer: Arc::new(NoopObserver),
            conversation: Mutex::new(conversation),
            state: Mutex::new(SessionState::Idle),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_conversation(mut self, conversation: Conversation) -> Self {
        self.conversation = Mutex::new(conversation);
        self
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Snapshot of the current messages.
    pub async fn messages(&self) -> Vec<Message> {
        self.conversation.lock().await.messages().to_vec()
    }

    /// Submit user text and stream the assistant's reply into a placeholder.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        {
            let mut state = self.state.lock().await;
            if !state.accepts_input() {
                debug!("Submission rejected while {:?}", *state);
                return SubmitOutcome::Busy;
            }
            *state = SessionState::Sending;
        }
        self.observer.state_changed(SessionState::Sending);

        let (history, placeholder) = self.begin_exchange(text).await;

        let outcome = match self.stream_reply(&history, placeholder).await {
            Ok(()) => {
                info!("Reply {} completed", placeholder);
                SubmitOutcome::Completed { reply: placeholder }
            }
            Err(e) => {
                warn!("Reply {} failed: {}", placeholder, e);
                let fallback = Message::assistant(FALLBACK_REPLY, self.clock.now());
                self.conversation.lock().await.push(fallback.clone());
                self.observer.message_appended(&fallback);
                SubmitOutcome::Failed { reply: placeholder }
            }
        };

        self.set_state(SessionState::Idle).await;
        outcome
    }

    /// Append the user message and an empty placeholder. Returns the history
    /// to send, which ends with the user message and excludes the placeholder.
    async fn begin_exchange(&self, text: &str) -> (Vec<Message>, MessageId) {
        let user_message = Message::user(text, self.clock.now());
        let placeholder = Message::assistant("", self.clock.now());
        let placeholder_id = placeholder.id();

        let history = {
            let mut conversation = self.conversation.lock().await;
            conversation.push(user_message.clone());
            let history = conversation.messages().to_vec();
            conversation.push(placeholder.clone());
            history
        };

        self.observer.message_appended(&user_message);
        self.observer.message_appended(&placeholder);

        (history, placeholder_id)
    }

    async fn stream_reply(&self, history: &[Message], placeholder: MessageId) -> Result<(), DomainError> {
        let mut body = self.transport.send(history).await?;
        self.set_state(SessionState::Streaming).await;

        let mut decoder = Utf8StreamDecoder::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let text = decoder.decode(&chunk);
            self.apply_fragment(placeholder, &text).await?;
        }
        let tail = decoder.finish();
        self.apply_fragment(placeholder, &tail).await
    }

    async fn apply_fragment(&self, placeholder: MessageId, text: &str) -> Result<(), DomainError> {
        if text.is_empty() {
            return Ok(());
        }

        let updated = {
            let mut conversation = self.conversation.lock().await;
            conversation
                .append_to(placeholder, text, self.clock.now())
                .cloned()
                .ok_or_else(|| DomainError::internal(format!("placeholder {placeholder} is missing")))?
        };
        self.observer.message_updated(&updated, text);
        Ok(())
    }

    async fn set_state(&self, next: SessionState) {
        *self.state.lock().await = next;
        self.observer.state_changed(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tokio::sync::Notify;

    use crate::application::ByteStream;
    use crate::domain::{Role, GREETING};

    /// Clock that advances one second per reading.
    struct TickingClock {
        start: DateTime<Utc>,
        ticks: StdMutex<i64>,
    }

    impl TickingClock {
        fn new() -> Self {
            Self {
                start: Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap(),
                ticks: StdMutex::new(0),
            }
        }

        fn last(&self) -> DateTime<Utc> {
            self.start + Duration::seconds(*self.ticks.lock().unwrap() - 1)
        }
    }

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut ticks = self.ticks.lock().unwrap();
            let now = self.start + Duration::seconds(*ticks);
            *ticks += 1;
            now
        }
    }

    struct ScriptedTransport {
        chunks: Vec<Result<Vec<u8>, String>>,
        sent: StdMutex<Vec<Vec<Message>>>,
        gate: Option<Arc<Notify>>,
        refuse: bool,
    }

    impl ScriptedTransport {
        fn new(chunks: Vec<Result<Vec<u8>, String>>) -> Self {
            Self {
                chunks,
                sent: StdMutex::new(Vec::new()),
                gate: None,
                refuse: false,
            }
        }

        fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::new(vec![])
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn sent(&self) -> Vec<Vec<Message>> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RelayTransport for ScriptedTransport {
        async fn send(&self, history: &[Message]) -> Result<ByteStream, DomainError> {
            self.sent.lock().unwrap().push(history.to_vec());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.refuse {
                return Err(DomainError::transport("connection refused"));
            }
            let items: Vec<Result<Bytes, DomainError>> = self
                .chunks
                .iter()
                .map(|c| match c {
                    Ok(bytes) => Ok(Bytes::from(bytes.clone())),
                    Err(e) => Err(DomainError::transport(e.clone())),
                })
                .collect();
            Ok(Box::pin(futures_util::stream::iter(items)))
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: StdMutex<Vec<String>>,
    }

    impl ChatObserver for RecordingObserver {
        fn message_appended(&self, message: &Message) {
            self.events
                .lock()
                .unwrap()
                .push(format!("append:{}:{}", message.role(), message.content()));
        }

        fn message_updated(&self, _message: &Message, delta: &str) {
            self.events.lock().unwrap().push(format!("update:{delta}"));
        }

        fn state_changed(&self, state: SessionState) {
            self.events.lock().unwrap().push(format!("state:{state:?}"));
        }
    }

    fn ok(text: &str) -> Result<Vec<u8>, String> {
        Ok(text.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn blank_submission_is_ignored() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok("x")]));
        let session = ChatSession::new(transport.clone(), Arc::new(TickingClock::new()));

        assert_eq!(session.submit("   \n\t").await, SubmitOutcome::Ignored);

        assert_eq!(session.messages().await.len(), 1);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn streamed_reply_fills_placeholder() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok("Use"),
            ok(" the"),
            ok(" Forgot Password link."),
        ]));
        let clock = Arc::new(TickingClock::new());
        let session = ChatSession::new(transport.clone(), clock.clone());

        let outcome = session.submit("How do I reset my password?").await;

        let SubmitOutcome::Completed { reply } = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        let messages = session.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content(), GREETING);
        assert_eq!(messages[1].role(), Role::User);
        let last = &messages[2];
        assert_eq!(last.id(), reply);
        assert_eq!(last.content(), "Use the Forgot Password link.");
        assert_eq!(last.timestamp(), clock.last());
        assert_eq!(session.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn history_sent_excludes_placeholder() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok("ok")]));
        let session = ChatSession::new(transport.clone(), Arc::new(TickingClock::new()));

        session.submit("first").await;
        session.submit("second").await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        let contents: Vec<&str> = sent[0].iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec![GREETING, "first"]);
        let contents: Vec<&str> = sent[1].iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec![GREETING, "first", "ok", "second"]);
    }

    #[tokio::test]
    async fn mid_stream_error_keeps_partial_and_appends_fallback() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            ok("Partial"),
            Err("stream reset".to_string()),
        ]));
        let session = ChatSession::new(transport, Arc::new(TickingClock::new()));

        let outcome = session.submit("hello").await;

        let SubmitOutcome::Failed { reply } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        let messages = session.messages().await;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].id(), reply);
        assert_eq!(messages[2].content(), "Partial");
        assert_eq!(messages[3].content(), FALLBACK_REPLY);
        assert_eq!(
            messages.iter().filter(|m| m.content() == FALLBACK_REPLY).count(),
            1
        );
        assert_eq!(session.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn transport_failure_leaves_empty_placeholder_and_fallback() {
        let transport = Arc::new(ScriptedTransport::refusing());
        let session = ChatSession::new(transport, Arc::new(TickingClock::new()));

        let outcome = session.submit("hello").await;

        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        let messages = session.messages().await;
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].content(), "");
        assert_eq!(messages[3].content(), FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn multibyte_characters_split_across_chunks_are_reassembled() {
        let bytes = "Olá ✓".as_bytes();
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(bytes[..3].to_vec()),
            Ok(bytes[3..bytes.len() - 1].to_vec()),
            Ok(bytes[bytes.len() - 1..].to_vec()),
        ]));
        let session = ChatSession::new(transport, Arc::new(TickingClock::new()));

        session.submit("hi").await;

        assert_eq!(session.messages().await[2].content(), "Olá ✓");
    }

    #[tokio::test]
    async fn submission_while_in_flight_is_rejected() {
        let gate = Arc::new(Notify::new());
        let transport = Arc::new(ScriptedTransport::new(vec![ok("done")]).gated(gate.clone()));
        let session = Arc::new(ChatSession::new(transport.clone(), Arc::new(TickingClock::new())));

        let first = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.submit("one").await })
        };
        while session.state().await == SessionState::Idle {
            tokio::task::yield_now().await;
        }

        assert_eq!(session.submit("two").await, SubmitOutcome::Busy);

        gate.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));

        let messages = session.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages
                .iter()
                .filter(|m| m.role() == Role::Assistant && m.content() != GREETING)
                .count(),
            1
        );
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn observer_sees_every_change_in_order() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok("Hi"), ok("!")]));
        let observer = Arc::new(RecordingObserver::default());
        let session = ChatSession::new(transport, Arc::new(TickingClock::new()))
            .with_observer(observer.clone());

        session.submit("hello").await;

        let events = observer.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "state:Sending",
                "append:user:hello",
                "append:assistant:",
                "state:Streaming",
                "update:Hi",
                "update:!",
                "state:Idle",
            ]
        );
    }
}
