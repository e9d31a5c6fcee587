//! Expression tree produced by decompilation and consumed by the rewrite
//! passes.

mod display;
mod event;
mod fold;
mod types;

pub use event::EventAccessorCall;
pub use fold::ExprFolder;
pub use types::*;
