//! Novel Context - Errors

use thiserror::Error;

use super::NovelId;
use crate::domain::user::UserId;

#[derive(Debug, Error)]
pub enum NovelError {
    #[error("用户 {user_id} 不是小说 {novel_id} 的作者")]
    NotOwner { novel_id: NovelId, user_id: UserId },
}
