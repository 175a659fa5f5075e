//! Merge Request Commands

use crate::domain::chapter::ChapterId;
use crate::domain::merge_request::MergeRequestId;
use crate::domain::novel::NovelId;
use crate::domain::user::UserId;

/// 提交合并请求命令
#[derive(Debug, Clone)]
pub struct SubmitMergeRequest {
    pub novel_id: NovelId,
    pub from_chapter_id: ChapterId,
    pub requester: UserId,
    pub review_comment: Option<String>,
}

/// 接纳合并请求命令（仅小说作者）
#[derive(Debug, Clone)]
pub struct ApproveMergeRequest {
    pub merge_request_id: MergeRequestId,
    pub reviewer: UserId,
}

/// 拒绝合并请求命令（仅小说作者）
#[derive(Debug, Clone)]
pub struct RejectMergeRequest {
    pub merge_request_id: MergeRequestId,
    pub reviewer: UserId,
    pub review_comment: Option<String>,
}
