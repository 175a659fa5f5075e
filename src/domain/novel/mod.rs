//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 小说聚合管理
//! - 作者归属（合并请求的裁决权属于小说作者）

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::Novel;
pub use errors::NovelError;
pub use value_objects::{Description, NovelId, Title};
