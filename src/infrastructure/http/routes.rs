//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                                  GET              健康检查
//! - /api/users                                 POST             注册用户
//! - /api/users/me                              GET              当前用户
//! - /api/novels                                GET / POST       列出 / 创建小说
//! - /api/novels/:novel_id                      GET / PUT / DELETE
//! - /api/novels/:novel_id/chapters             GET / POST       全部章节 / 创建主线章节
//! - /api/novels/:novel_id/chapters/main        GET              主线章节
//! - /api/novels/:novel_id/chapters/merged      GET              已接纳的分支
//! - /api/novels/:novel_id/merge-requests       GET / POST       合并请求列表 / 提交
//! - /api/chapters/:chapter_id                  GET / PUT / DELETE
//! - /api/chapters/:chapter_id/fork             POST             创建分支
//! - /api/chapters/:chapter_id/forks            GET              直接分支
//! - /api/chapters/:chapter_id/merged           GET              已接纳的子分支
//! - /api/chapters/:chapter_id/can-submit       GET              提交资格
//! - /api/merge-requests/:id                    GET              合并请求详情
//! - /api/merge-requests/:id/approve            POST             接纳
//! - /api/merge-requests/:id/reject             POST             拒绝
//! - /ws/events                                 WS               全局事件
//! - /ws/novels/:novel_id                       WS               单本小说事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::global_websocket_handler))
        .route("/ws/novels/:novel_id", get(handlers::novel_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/users", user_routes())
        .nest("/novels", novel_routes())
        .nest("/chapters", chapter_routes())
        .nest("/merge-requests", merge_request_routes())
}

/// User 路由
fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::register_user))
        .route("/me", get(handlers::current_user))
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_novels).post(handlers::create_novel))
        .route(
            "/:novel_id",
            get(handlers::get_novel)
                .put(handlers::update_novel)
                .delete(handlers::delete_novel),
        )
        .route(
            "/:novel_id/chapters",
            get(handlers::list_chapters).post(handlers::create_main_chapter),
        )
        .route("/:novel_id/chapters/main", get(handlers::list_main_chapters))
        .route("/:novel_id/chapters/merged", get(handlers::list_merged_chapters))
        .route(
            "/:novel_id/merge-requests",
            get(handlers::list_merge_requests).post(handlers::submit_merge_request),
        )
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/:chapter_id",
            get(handlers::get_chapter)
                .put(handlers::update_chapter)
                .delete(handlers::delete_chapter),
        )
        .route("/:chapter_id/fork", post(handlers::fork_chapter))
        .route("/:chapter_id/forks", get(handlers::list_forks))
        .route("/:chapter_id/merged", get(handlers::list_merged_children))
        .route("/:chapter_id/can-submit", get(handlers::can_submit))
}

/// Merge Request 路由
fn merge_request_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:id", get(handlers::get_merge_request))
        .route("/:id/approve", post(handlers::approve_merge_request))
        .route("/:id/reject", post(handlers::reject_merge_request))
}
