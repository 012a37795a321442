pub mod docx;
pub mod memo_maker;
pub mod registry;

pub use memo_maker::MemoMaker;
pub use registry::*;
