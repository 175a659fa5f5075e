//! Chapter Context - 章节限界上下文
//!
//! 职责:
//! - 主线章节与分支章节
//! - 章节谱系（main / fork / merged）及其不变量
//! - 分支晋升为已合并

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::Chapter;
pub use errors::ChapterError;
pub use value_objects::{BranchType, ChapterContent, ChapterId, ChapterNumber, Lineage};
