mod chat_observer;
mod clock;
mod completion_provider;
mod relay_transport;

pub use chat_observer::*;
pub use clock::*;
pub use completion_provider::*;
pub use relay_transport::*;
