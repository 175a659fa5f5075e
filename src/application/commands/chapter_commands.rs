//! Chapter Commands

use crate::domain::chapter::ChapterId;
use crate::domain::novel::NovelId;
use crate::domain::user::UserId;

/// 创建主线章节命令（仅小说作者）
#[derive(Debug, Clone)]
pub struct CreateMainChapter {
    pub novel_id: NovelId,
    pub author: UserId,
    pub title: String,
    pub content: String,
    pub chapter_number: i64,
}

/// 分支章节命令
#[derive(Debug, Clone)]
pub struct ForkChapter {
    pub source_chapter_id: ChapterId,
    pub author: UserId,
    pub title: String,
    pub content: String,
}

/// 修改章节命令（仅章节作者）
#[derive(Debug, Clone)]
pub struct UpdateChapter {
    pub chapter_id: ChapterId,
    pub actor: UserId,
    pub title: String,
    pub content: String,
}

/// 删除章节命令（仅章节作者）
#[derive(Debug, Clone)]
pub struct DeleteChapter {
    pub chapter_id: ChapterId,
    pub actor: UserId,
}
