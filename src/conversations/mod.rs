pub mod two_agent_chat;
pub mod types;

pub use two_agent_chat::*;
pub use types::*;
