//! User Queries

use crate::domain::user::UserId;

/// 获取用户查询
#[derive(Debug, Clone)]
pub struct GetUser {
    pub user_id: UserId,
}
