//! User Context - Entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, UserId, Username};

/// 用户
///
/// 不变量:
/// - username、email 全局唯一（由持久化层保证）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: Username,
    email: Email,
    created_at: DateTime<Utc>,
}

impl User {
    /// 注册新用户
    pub fn register(username: Username, email: Email) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            created_at: Utc::now(),
        }
    }

    /// 从持久化数据重建
    pub fn restore(id: UserId, username: Username, email: Email, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username,
            email,
            created_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
