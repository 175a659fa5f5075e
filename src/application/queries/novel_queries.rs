//! Novel Queries

use crate::domain::novel::NovelId;

/// 获取小说详情查询
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub novel_id: NovelId,
}

/// 分页列出小说查询（最新的在前）
#[derive(Debug, Clone)]
pub struct ListNovels {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}
