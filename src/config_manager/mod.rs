pub mod stateless_llm;

pub use stateless_llm::*;
