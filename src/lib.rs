pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ByteStream, ChatObserver, ChatSession, Clock, CompletionProvider, NoopObserver,
    RelayByteStream, RelayChatUseCase, RelayTransport, SessionState, SubmitOutcome,
    TextDeltaStream, FALLBACK_REPLY,
};

pub use cli::Commands;

pub use connector::{
    HttpRelayTransport, OpenAiCompletionProvider, ScriptedCompletionProvider, SystemClock,
    TerminalView,
};

pub use domain::{
    ChatMessage, Conversation, DomainError, Message, MessageId, Role, SystemInstruction,
    Utf8StreamDecoder, GREETING,
};
