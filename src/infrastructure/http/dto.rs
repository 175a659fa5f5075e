//! Data Transfer Objects

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::{ChapterView, MergeRequestView, NovelView, SubmissionView, UserView};
use crate::domain::chapter::BranchType;
use crate::domain::merge_request::MergeStatus;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// User DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<UserView> for UserResponse {
    fn from(view: UserView) -> Self {
        Self {
            id: view.id,
            username: view.username,
            email: view.email,
            created_at: timestamp(view.created_at),
        }
    }
}

// ============================================================================
// Novel DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct NovelResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NovelView> for NovelResponse {
    fn from(view: NovelView) -> Self {
        Self {
            id: view.id,
            title: view.title,
            description: view.description,
            author_id: view.author_id,
            created_at: timestamp(view.created_at),
            updated_at: timestamp(view.updated_at),
        }
    }
}

// ============================================================================
// Chapter DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub content: String,
    pub chapter_number: i64,
    pub parent_chapter_id: Option<Uuid>,
    pub branch_type: BranchType,
    pub author_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_chapter_title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ChapterView> for ChapterResponse {
    fn from(view: ChapterView) -> Self {
        Self {
            id: view.id,
            novel_id: view.novel_id,
            title: view.title,
            content: view.content,
            chapter_number: view.chapter_number,
            parent_chapter_id: view.parent_chapter_id,
            branch_type: view.branch_type,
            author_id: view.author_id,
            author_username: view.author_username,
            parent_chapter_title: view.parent_chapter_title,
            created_at: timestamp(view.created_at),
            updated_at: timestamp(view.updated_at),
        }
    }
}

// ============================================================================
// Merge Request DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MergeRequestResponse {
    pub id: Uuid,
    pub from_chapter_id: Uuid,
    pub to_novel_id: Uuid,
    pub status: MergeStatus,
    pub requested_by: Uuid,
    pub review_comment: Option<String>,
    pub created_at: String,
    pub reviewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_chapter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_username: Option<String>,
}

impl From<MergeRequestView> for MergeRequestResponse {
    fn from(view: MergeRequestView) -> Self {
        Self {
            id: view.id,
            from_chapter_id: view.from_chapter_id,
            to_novel_id: view.to_novel_id,
            status: view.status,
            requested_by: view.requested_by,
            review_comment: view.review_comment,
            created_at: timestamp(view.created_at),
            reviewed_at: view.reviewed_at.map(timestamp),
            from_chapter_title: view.from_chapter_title,
            requester_username: view.requester_username,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub can_submit: bool,
    pub reason: Option<String>,
}

impl From<SubmissionView> for SubmissionResponse {
    fn from(view: SubmissionView) -> Self {
        Self {
            can_submit: view.can_submit,
            reason: view.reason,
        }
    }
}
