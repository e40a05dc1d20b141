use chrono::{DateTime, Utc};

use super::{Message, MessageId};

/// Greeting shown when a new chat session opens.
pub const GREETING: &str = "Hi! I'm the Headstarter support assistant. How can I help you today?";

/// Ordered, append-only list of chat messages for one session.
///
/// Messages are only ever mutated through [`Conversation::append_to`], which
/// addresses the target by identity rather than by position.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation seeded with the assistant greeting.
    pub fn with_greeting(now: DateTime<Utc>) -> Self {
        let mut conversation = Self::new();
        conversation.push(Message::assistant(GREETING, now));
        conversation
    }

    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id();
        self.messages.push(message);
        id
    }

    /// Append `delta` to the message identified by `id`.
    ///
    /// Returns the updated message, or `None` if no such message exists.
    pub fn append_to(
        &mut self,
        id: MessageId,
        delta: &str,
        now: DateTime<Utc>,
    ) -> Option<&Message> {
        let message = self.messages.iter_mut().find(|m| m.id() == id)?;
        message.append(delta, now);
        Some(message)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
