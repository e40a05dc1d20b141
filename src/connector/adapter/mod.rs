mod http_relay_transport;
mod openai_completion_provider;
mod scripted_completion_provider;
mod system_clock;
mod terminal_view;

pub use http_relay_transport::*;
pub use openai_completion_provider::*;
pub use scripted_completion_provider::*;
pub use system_clock::*;
pub use terminal_view::*;
