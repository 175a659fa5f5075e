//! Chapter Context - Errors

use thiserror::Error;

use super::{BranchType, ChapterId};
use crate::domain::user::UserId;

#[derive(Debug, Error)]
pub enum ChapterError {
    #[error("只有分支章节可以被合并: 章节 {chapter_id} 当前为 {branch_type}")]
    NotAFork {
        chapter_id: ChapterId,
        branch_type: BranchType,
    },

    #[error("用户 {user_id} 不是章节 {chapter_id} 的作者")]
    NotAuthor { chapter_id: ChapterId, user_id: UserId },

    #[error("章节谱系不一致: {0}")]
    InconsistentLineage(String),
}
