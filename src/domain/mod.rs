//! Domain Layer - 领域层
//!
//! 包含四个限界上下文:
//! - Novel Context: 小说管理
//! - Chapter Context: 章节与分支谱系
//! - Merge Request Context: 合并请求工作流
//! - User Context: 用户身份

pub mod chapter;
pub mod merge_request;
pub mod novel;
pub mod user;
