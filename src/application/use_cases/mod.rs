mod chat_session;
mod relay_chat;

pub use chat_session::*;
pub use relay_chat::*;
