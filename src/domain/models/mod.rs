mod conversation;
mod message;
mod system_instruction;

pub use conversation::*;
pub use message::*;
pub use system_instruction::*;
