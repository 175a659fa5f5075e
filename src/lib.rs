//! NovelFork - 协作小说分支与合并后端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 小说与作者归属
//! - Chapter Context: 主线 / 分支 / 已合并章节谱系
//! - Merge Request Context: 合并请求状态机与提交资格
//! - User Context: 用户身份
//!
//! 应用层 (application/):
//! - Ports: 仓储端口定义
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Persistence: SQLite 存储
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
