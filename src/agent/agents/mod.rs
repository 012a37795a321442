pub mod conversable_agent;
pub mod user_proxy;

pub use conversable_agent::*;
pub use user_proxy::*;
