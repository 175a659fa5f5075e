//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod chapter_queries;
mod merge_request_queries;
mod novel_queries;
mod user_queries;

pub mod handlers;

pub use chapter_queries::*;
pub use merge_request_queries::*;
pub use novel_queries::*;
pub use user_queries::*;
