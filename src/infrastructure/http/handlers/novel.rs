//! Novel HTTP Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{CreateNovel, DeleteNovel, GetNovel, ListNovels, NovelView, UpdateNovel};
use crate::domain::novel::NovelId;
use crate::infrastructure::http::auth::CurrentUser;
use crate::infrastructure::http::dto::{ApiResponse, Empty, NovelResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListNovelsParams {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NovelRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 分页列出小说
pub async fn list_novels(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListNovelsParams>,
) -> Result<Json<ApiResponse<Vec<NovelResponse>>>, ApiError> {
    let novels = state
        .list_novels_handler
        .handle(ListNovels {
            skip: params.skip,
            limit: params.limit,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        novels.into_iter().map(NovelResponse::from).collect(),
    )))
}

/// 创建小说
pub async fn create_novel(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<NovelRequest>,
) -> Result<Json<ApiResponse<NovelResponse>>, ApiError> {
    let novel = state
        .create_novel_handler
        .handle(CreateNovel {
            author: current.id(),
            title: req.title,
            description: req.description,
        })
        .await?;

    Ok(Json(ApiResponse::success(NovelView::from(novel).into())))
}

/// 获取小说详情
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<NovelResponse>>, ApiError> {
    let novel = state
        .get_novel_handler
        .handle(GetNovel {
            novel_id: NovelId::from_uuid(novel_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(novel.into())))
}

/// 更新小说（仅作者）
pub async fn update_novel(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
    current: CurrentUser,
    Json(req): Json<NovelRequest>,
) -> Result<Json<ApiResponse<NovelResponse>>, ApiError> {
    let novel = state
        .update_novel_handler
        .handle(UpdateNovel {
            novel_id: NovelId::from_uuid(novel_id),
            actor: current.id(),
            title: req.title,
            description: req.description,
        })
        .await?;

    Ok(Json(ApiResponse::success(NovelView::from(novel).into())))
}

/// 删除小说（仅作者），章节和合并请求一并删除
pub async fn delete_novel(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let novel_id = NovelId::from_uuid(novel_id);

    state
        .delete_novel_handler
        .handle(DeleteNovel {
            novel_id,
            actor: current.id(),
        })
        .await?;

    state.event_publisher.publish_novel_deleted(novel_id);

    Ok(Json(ApiResponse::ok()))
}
