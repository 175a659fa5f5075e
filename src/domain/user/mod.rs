//! User Context - 用户限界上下文
//!
//! 职责:
//! - 用户身份（由外部认证网关解析，核心只关心 UserId）
//! - 用户名、邮箱校验

mod entities;
mod value_objects;

pub use entities::User;
pub use value_objects::{Email, UserId, Username};
