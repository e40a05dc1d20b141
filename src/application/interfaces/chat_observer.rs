use crate::application::SessionState;
use crate::domain::Message;

/// Receives every visible change of a chat session so a view can re-render
/// and keep the newest message in sight.
pub trait ChatObserver: Send + Sync {
    fn message_appended(&self, message: &Message);

    /// `delta` is the text just appended to `message`.
    fn message_updated(&self, message: &Message, delta: &str);

    fn state_changed(&self, _state: SessionState) {}
}

/// Observer that ignores all notifications.
pub struct NoopObserver;

impl ChatObserver for NoopObserver {
    fn message_appended(&self, _message: &Message) {}

    fn message_updated(&self, _message: &Message, _delta: &str) {}
}
