use chrono::{DateTime, Utc};

/// Source of message timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
