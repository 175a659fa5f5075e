//! User Commands

/// 注册用户命令
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
}
