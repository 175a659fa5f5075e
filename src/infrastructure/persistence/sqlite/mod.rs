//! SQLite Persistence - SQLite 数据库持久化实现

mod chapter_repo;
mod database;
mod merge_request_repo;
mod novel_repo;
mod user_repo;

pub use chapter_repo::*;
pub use database::*;
pub use merge_request_repo::*;
pub use novel_repo::*;
pub use user_repo::*;
