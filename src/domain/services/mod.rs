//! Domain services shared by the relay and the chat client.

mod utf8_decoder;

pub use utf8_decoder::*;
