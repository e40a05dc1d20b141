use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::application::{ChatObserver, SessionState};
use crate::domain::{Message, Role};

pub const ASSISTANT_LABEL: &str = "Headstarter Assistance";
pub const USER_LABEL: &str = "You";

/// 24-hour `HH:MM:SS` in the given offset.
pub fn format_timestamp(timestamp: DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp.with_timezone(offset).format("%H:%M:%S").to_string()
}

/// Line-oriented chat view: each message gets a `label | time` header and
/// assistant replies are printed fragment by fragment as they stream in.
pub struct TerminalView<W: Write + Send> {
    out: Mutex<W>,
    offset: FixedOffset,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), *Local::now().offset())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, offset: FixedOffset) -> Self {
        Self {
            out: Mutex::new(out),
            offset,
        }
    }

    /// Print a full transcript, e.g. the greeting of a fresh session.
    pub fn render_history(&self, messages: &[Message]) {
        for message in messages {
            self.message_appended(message);
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn header(&self, message: &Message) -> String {
        let label = match message.role() {
            Role::Assistant => ASSISTANT_LABEL,
            Role::User => USER_LABEL,
            Role::System => "System",
        };
        format!(
            "{} | {}",
            label,
            format_timestamp(message.timestamp(), &self.offset)
        )
    }

    fn write(&self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        // Observers cannot fail; write errors are dropped.
        let _ = f(&mut *out).and_then(|_| out.flush());
    }
}

impl<W: Write + Send> ChatObserver for TerminalView<W> {
    fn message_appended(&self, message: &Message) {
        let header = self.header(message);
        self.write(|out| {
            writeln!(out, "\n{header}")?;
            if !message.content().is_empty() {
                writeln!(out, "{}", message.content())?;
            }
            Ok(())
        });
    }

    fn message_updated(&self, _message: &Message, delta: &str) {
        self.write(|out| write!(out, "{delta}"));
    }

    fn state_changed(&self, state: SessionState) {
        if state == SessionState::Idle {
            self.write(|out| writeln!(out));
        }
    }
}
