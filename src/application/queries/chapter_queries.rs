//! Chapter Queries

use crate::domain::chapter::{BranchType, ChapterId};
use crate::domain::novel::NovelId;

/// 获取章节详情查询
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub chapter_id: ChapterId,
}

/// 列出小说章节查询
///
/// `branch_type` 为 None 时列出全部章节
#[derive(Debug, Clone)]
pub struct ListNovelChapters {
    pub novel_id: NovelId,
    pub branch_type: Option<BranchType>,
}

/// 列出章节的直接分支查询
#[derive(Debug, Clone)]
pub struct ListForks {
    pub chapter_id: ChapterId,
}

/// 列出章节下已被接纳的分支查询
#[derive(Debug, Clone)]
pub struct ListMergedChildren {
    pub chapter_id: ChapterId,
}
