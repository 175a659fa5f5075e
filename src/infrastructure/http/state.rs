//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use axum::http::HeaderName;
use std::sync::Arc;

use crate::application::{
    // Command handlers
    ApproveMergeRequestHandler, CreateMainChapterHandler, CreateNovelHandler, DeleteChapterHandler,
    DeleteNovelHandler, ForkChapterHandler, RegisterUserHandler, RejectMergeRequestHandler,
    SubmitMergeRequestHandler, UpdateChapterHandler, UpdateNovelHandler,
    // Query handlers
    CheckSubmissionHandler, GetChapterHandler, GetMergeRequestHandler, GetNovelHandler,
    GetUserHandler, ListForksHandler, ListMergeRequestsHandler, ListMergedChildrenHandler,
    ListNovelChaptersHandler, ListNovelsHandler,
    // Ports
    ChapterRepositoryPort, MergeRequestRepositoryPort, NovelRepositoryPort, UserRepositoryPort,
};
use crate::infrastructure::events::EventPublisher;

/// 默认的操作者请求头
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub user_repo: Arc<dyn UserRepositoryPort>,
    pub event_publisher: Arc<EventPublisher>,
    /// 携带操作者 ID 的请求头
    pub user_header: HeaderName,

    // ========== Command Handlers ==========
    pub register_user_handler: RegisterUserHandler,
    pub create_novel_handler: CreateNovelHandler,
    pub update_novel_handler: UpdateNovelHandler,
    pub delete_novel_handler: DeleteNovelHandler,
    pub create_main_chapter_handler: CreateMainChapterHandler,
    pub fork_chapter_handler: ForkChapterHandler,
    pub update_chapter_handler: UpdateChapterHandler,
    pub delete_chapter_handler: DeleteChapterHandler,
    pub submit_merge_request_handler: SubmitMergeRequestHandler,
    pub approve_merge_request_handler: ApproveMergeRequestHandler,
    pub reject_merge_request_handler: RejectMergeRequestHandler,

    // ========== Query Handlers ==========
    pub get_user_handler: GetUserHandler,
    pub get_novel_handler: GetNovelHandler,
    pub list_novels_handler: ListNovelsHandler,
    pub get_chapter_handler: GetChapterHandler,
    pub list_novel_chapters_handler: ListNovelChaptersHandler,
    pub list_forks_handler: ListForksHandler,
    pub list_merged_children_handler: ListMergedChildrenHandler,
    pub check_submission_handler: CheckSubmissionHandler,
    pub get_merge_request_handler: GetMergeRequestHandler,
    pub list_merge_requests_handler: ListMergeRequestsHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
        user_header: HeaderName,
    ) -> Self {
        Self {
            // Ports
            user_repo: user_repo.clone(),
            event_publisher,
            user_header,

            // Command handlers
            register_user_handler: RegisterUserHandler::new(user_repo.clone()),
            create_novel_handler: CreateNovelHandler::new(novel_repo.clone()),
            update_novel_handler: UpdateNovelHandler::new(novel_repo.clone()),
            delete_novel_handler: DeleteNovelHandler::new(novel_repo.clone()),
            create_main_chapter_handler: CreateMainChapterHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            fork_chapter_handler: ForkChapterHandler::new(chapter_repo.clone()),
            update_chapter_handler: UpdateChapterHandler::new(chapter_repo.clone()),
            delete_chapter_handler: DeleteChapterHandler::new(chapter_repo.clone()),
            submit_merge_request_handler: SubmitMergeRequestHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                merge_request_repo.clone(),
            ),
            approve_merge_request_handler: ApproveMergeRequestHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                merge_request_repo.clone(),
            ),
            reject_merge_request_handler: RejectMergeRequestHandler::new(
                novel_repo.clone(),
                merge_request_repo.clone(),
            ),

            // Query handlers
            get_user_handler: GetUserHandler::new(user_repo.clone()),
            get_novel_handler: GetNovelHandler::new(novel_repo.clone()),
            list_novels_handler: ListNovelsHandler::new(novel_repo.clone()),
            get_chapter_handler: GetChapterHandler::new(user_repo.clone(), chapter_repo.clone()),
            list_novel_chapters_handler: ListNovelChaptersHandler::new(
                user_repo.clone(),
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            list_forks_handler: ListForksHandler::new(user_repo.clone(), chapter_repo.clone()),
            list_merged_children_handler: ListMergedChildrenHandler::new(
                user_repo.clone(),
                chapter_repo.clone(),
            ),
            check_submission_handler: CheckSubmissionHandler::new(
                chapter_repo.clone(),
                merge_request_repo.clone(),
            ),
            get_merge_request_handler: GetMergeRequestHandler::new(
                user_repo.clone(),
                chapter_repo.clone(),
                merge_request_repo.clone(),
            ),
            list_merge_requests_handler: ListMergeRequestsHandler::new(
                user_repo,
                novel_repo,
                chapter_repo,
                merge_request_repo,
            ),
        }
    }
}
