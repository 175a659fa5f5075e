//! Chapter HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    ChapterView, CheckSubmission, CreateMainChapter, DeleteChapter, ForkChapter, GetChapter,
    ListForks, ListMergedChildren, ListNovelChapters, UpdateChapter,
};
use crate::domain::chapter::{BranchType, ChapterId};
use crate::domain::novel::NovelId;
use crate::infrastructure::http::auth::CurrentUser;
use crate::infrastructure::http::dto::{ApiResponse, ChapterResponse, Empty, SubmissionResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateChapterRequest {
    pub title: String,
    pub content: String,
    pub chapter_number: i64,
}

/// 分支与修改共用：只允许改标题和正文
#[derive(Debug, Deserialize)]
pub struct ChapterTextRequest {
    pub title: String,
    pub content: String,
}

fn chapter_list(views: Vec<ChapterView>) -> Json<ApiResponse<Vec<ChapterResponse>>> {
    Json(ApiResponse::success(
        views.into_iter().map(ChapterResponse::from).collect(),
    ))
}

// ============================================================================
// Novel-scoped
// ============================================================================

async fn list_by_branch(
    state: &AppState,
    novel_id: Uuid,
    branch_type: Option<BranchType>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    let chapters = state
        .list_novel_chapters_handler
        .handle(ListNovelChapters {
            novel_id: NovelId::from_uuid(novel_id),
            branch_type,
        })
        .await?;

    Ok(chapter_list(chapters))
}

/// 小说的全部章节
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    list_by_branch(&state, novel_id, None).await
}

/// 主线章节
pub async fn list_main_chapters(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    list_by_branch(&state, novel_id, Some(BranchType::Main)).await
}

/// 已被接纳的分支章节
pub async fn list_merged_chapters(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    list_by_branch(&state, novel_id, Some(BranchType::Merged)).await
}

/// 创建主线章节（仅小说作者）
pub async fn create_main_chapter(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
    current: CurrentUser,
    Json(req): Json<CreateChapterRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = state
        .create_main_chapter_handler
        .handle(CreateMainChapter {
            novel_id: NovelId::from_uuid(novel_id),
            author: current.id(),
            title: req.title,
            content: req.content,
            chapter_number: req.chapter_number,
        })
        .await?;

    let mut view = ChapterView::from(chapter);
    view.author_username = Some(current.0.username().to_string());

    Ok(Json(ApiResponse::success(view.into())))
}

// ============================================================================
// Chapter-scoped
// ============================================================================

/// 获取章节详情
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = state
        .get_chapter_handler
        .handle(GetChapter {
            chapter_id: ChapterId::from_uuid(chapter_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(chapter.into())))
}

/// 修改章节（仅章节作者）
pub async fn update_chapter(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<Uuid>,
    current: CurrentUser,
    Json(req): Json<ChapterTextRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = state
        .update_chapter_handler
        .handle(UpdateChapter {
            chapter_id: ChapterId::from_uuid(chapter_id),
            actor: current.id(),
            title: req.title,
            content: req.content,
        })
        .await?;

    let mut view = ChapterView::from(chapter);
    view.author_username = Some(current.0.username().to_string());

    Ok(Json(ApiResponse::success(view.into())))
}

/// 删除章节（仅章节作者，且没有子章节）
pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<Uuid>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_chapter_handler
        .handle(DeleteChapter {
            chapter_id: ChapterId::from_uuid(chapter_id),
            actor: current.id(),
        })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 从章节创建分支
pub async fn fork_chapter(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<Uuid>,
    current: CurrentUser,
    Json(req): Json<ChapterTextRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let fork = state
        .fork_chapter_handler
        .handle(ForkChapter {
            source_chapter_id: ChapterId::from_uuid(chapter_id),
            author: current.id(),
            title: req.title,
            content: req.content,
        })
        .await?;

    state.event_publisher.publish_chapter_forked(&fork);

    let view = state
        .get_chapter_handler
        .handle(GetChapter {
            chapter_id: *fork.id(),
        })
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}

/// 章节的直接分支（fork 状态）
pub async fn list_forks(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    let forks = state
        .list_forks_handler
        .handle(ListForks {
            chapter_id: ChapterId::from_uuid(chapter_id),
        })
        .await?;

    Ok(chapter_list(forks))
}

/// 章节下已被接纳的分支
pub async fn list_merged_children(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ChapterResponse>>>, ApiError> {
    let merged = state
        .list_merged_children_handler
        .handle(ListMergedChildren {
            chapter_id: ChapterId::from_uuid(chapter_id),
        })
        .await?;

    Ok(chapter_list(merged))
}

/// 当前用户能否提交该分支
pub async fn can_submit(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<Uuid>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<SubmissionResponse>>, ApiError> {
    let eligibility = state
        .check_submission_handler
        .handle(CheckSubmission {
            chapter_id: ChapterId::from_uuid(chapter_id),
            actor: current.id(),
        })
        .await?;

    Ok(Json(ApiResponse::success(eligibility.into())))
}
