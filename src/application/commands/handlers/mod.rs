//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod chapter_handlers;
mod merge_request_handlers;
mod novel_handlers;
mod user_handlers;

pub use chapter_handlers::*;
pub use merge_request_handlers::*;
pub use novel_handlers::*;
pub use user_handlers::*;
