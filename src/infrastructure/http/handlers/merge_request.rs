//! Merge Request HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    ApproveMergeRequest, GetMergeRequest, ListMergeRequests, MergeRequestView,
    RejectMergeRequest, SubmitMergeRequest,
};
use crate::domain::chapter::ChapterId;
use crate::domain::merge_request::MergeRequestId;
use crate::domain::novel::NovelId;
use crate::infrastructure::http::auth::CurrentUser;
use crate::infrastructure::http::dto::{ApiResponse, MergeRequestResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitMergeRequestRequest {
    pub from_chapter_id: Uuid,
    #[serde(default)]
    pub review_comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectMergeRequestRequest {
    #[serde(default)]
    pub review_comment: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 小说的合并请求（最新的在前）
pub async fn list_merge_requests(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<MergeRequestResponse>>>, ApiError> {
    let requests = state
        .list_merge_requests_handler
        .handle(ListMergeRequests {
            novel_id: NovelId::from_uuid(novel_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(
        requests.into_iter().map(MergeRequestResponse::from).collect(),
    )))
}

/// 提交合并请求
pub async fn submit_merge_request(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
    current: CurrentUser,
    Json(req): Json<SubmitMergeRequestRequest>,
) -> Result<Json<ApiResponse<MergeRequestResponse>>, ApiError> {
    let request = state
        .submit_merge_request_handler
        .handle(SubmitMergeRequest {
            novel_id: NovelId::from_uuid(novel_id),
            from_chapter_id: ChapterId::from_uuid(req.from_chapter_id),
            requester: current.id(),
            review_comment: req.review_comment,
        })
        .await?;

    state.event_publisher.publish_merge_request_submitted(&request);

    let mut view = MergeRequestView::from(request);
    view.requester_username = Some(current.0.username().to_string());

    Ok(Json(ApiResponse::success(view.into())))
}

/// 获取合并请求
pub async fn get_merge_request(
    State(state): State<Arc<AppState>>,
    Path(merge_request_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MergeRequestResponse>>, ApiError> {
    let request = state
        .get_merge_request_handler
        .handle(GetMergeRequest {
            merge_request_id: MergeRequestId::from_uuid(merge_request_id),
        })
        .await?;

    Ok(Json(ApiResponse::success(request.into())))
}

/// 接纳合并请求（仅小说作者）
pub async fn approve_merge_request(
    State(state): State<Arc<AppState>>,
    Path(merge_request_id): Path<Uuid>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<MergeRequestResponse>>, ApiError> {
    let request = state
        .approve_merge_request_handler
        .handle(ApproveMergeRequest {
            merge_request_id: MergeRequestId::from_uuid(merge_request_id),
            reviewer: current.id(),
        })
        .await?;

    state.event_publisher.publish_merge_request_reviewed(&request);

    Ok(Json(ApiResponse::success(
        MergeRequestView::from(request).into(),
    )))
}

/// 拒绝合并请求（仅小说作者），请求体可省略
pub async fn reject_merge_request(
    State(state): State<Arc<AppState>>,
    Path(merge_request_id): Path<Uuid>,
    current: CurrentUser,
    body: Option<Json<RejectMergeRequestRequest>>,
) -> Result<Json<ApiResponse<MergeRequestResponse>>, ApiError> {
    let Json(req) = body.unwrap_or_default();

    let request = state
        .reject_merge_request_handler
        .handle(RejectMergeRequest {
            merge_request_id: MergeRequestId::from_uuid(merge_request_id),
            reviewer: current.id(),
            review_comment: req.review_comment,
        })
        .await?;

    state.event_publisher.publish_merge_request_reviewed(&request);

    Ok(Json(ApiResponse::success(
        MergeRequestView::from(request).into(),
    )))
}
