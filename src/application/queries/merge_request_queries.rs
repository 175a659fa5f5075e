//! Merge Request Queries

use crate::domain::chapter::ChapterId;
use crate::domain::merge_request::MergeRequestId;
use crate::domain::novel::NovelId;
use crate::domain::user::UserId;

/// 获取合并请求查询
#[derive(Debug, Clone)]
pub struct GetMergeRequest {
    pub merge_request_id: MergeRequestId,
}

/// 列出小说的合并请求查询（最新的在前）
#[derive(Debug, Clone)]
pub struct ListMergeRequests {
    pub novel_id: NovelId,
}

/// 查询操作者能否提交某分支
#[derive(Debug, Clone)]
pub struct CheckSubmission {
    pub chapter_id: ChapterId,
    pub actor: UserId,
}
