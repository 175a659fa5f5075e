//! Merge Request Query Handlers

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, MergeRequestRepositoryPort, NovelRepositoryPort, UserRepositoryPort,
};
use crate::application::queries::{CheckSubmission, GetMergeRequest, ListMergeRequests};
use crate::domain::chapter::ChapterId;
use crate::domain::merge_request::{MergeRequest, MergeStatus, SubmitEligibility};
use crate::domain::user::UserId;

// ============================================================================
// Views
// ============================================================================

/// 合并请求视图
#[derive(Debug, Clone)]
pub struct MergeRequestView {
    pub id: Uuid,
    pub from_chapter_id: Uuid,
    pub to_novel_id: Uuid,
    pub status: MergeStatus,
    pub requested_by: Uuid,
    pub review_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub from_chapter_title: Option<String>,
    pub requester_username: Option<String>,
}

impl From<MergeRequest> for MergeRequestView {
    fn from(request: MergeRequest) -> Self {
        Self {
            id: *request.id().as_uuid(),
            from_chapter_id: *request.from_chapter_id().as_uuid(),
            to_novel_id: *request.to_novel_id().as_uuid(),
            status: request.status(),
            requested_by: *request.requested_by().as_uuid(),
            review_comment: request.review_comment().map(str::to_string),
            created_at: request.created_at(),
            reviewed_at: request.reviewed_at(),
            from_chapter_title: None,
            requester_username: None,
        }
    }
}

/// 提交资格视图
#[derive(Debug, Clone)]
pub struct SubmissionView {
    pub can_submit: bool,
    pub reason: Option<String>,
}

impl From<SubmitEligibility> for SubmissionView {
    fn from(eligibility: SubmitEligibility) -> Self {
        Self {
            can_submit: eligibility.can_submit(),
            reason: eligibility.reason().map(str::to_string),
        }
    }
}

/// 批量补全来源章节标题和提交者用户名
async fn enrich_requests(
    user_repo: &dyn UserRepositoryPort,
    chapter_repo: &dyn ChapterRepositoryPort,
    requests: Vec<MergeRequest>,
) -> Result<Vec<MergeRequestView>, ApplicationError> {
    let mut chapter_ids: Vec<ChapterId> = requests.iter().map(|r| *r.from_chapter_id()).collect();
    chapter_ids.sort_by_key(|id| *id.as_uuid());
    chapter_ids.dedup();

    let mut requester_ids: Vec<UserId> = requests.iter().map(|r| *r.requested_by()).collect();
    requester_ids.sort_by_key(|id| *id.as_uuid());
    requester_ids.dedup();

    let titles: HashMap<ChapterId, String> = chapter_repo
        .find_by_ids(&chapter_ids)
        .await?
        .into_iter()
        .map(|c| (*c.id(), c.title().as_str().to_string()))
        .collect();

    let usernames: HashMap<UserId, String> = user_repo
        .find_by_ids(&requester_ids)
        .await?
        .into_iter()
        .map(|u| (*u.id(), u.username().as_str().to_string()))
        .collect();

    Ok(requests
        .into_iter()
        .map(|request| {
            let from_chapter_title = titles.get(request.from_chapter_id()).cloned();
            let requester_username = usernames.get(request.requested_by()).cloned();

            let mut view = MergeRequestView::from(request);
            view.from_chapter_title = from_chapter_title;
            view.requester_username = requester_username;
            view
        })
        .collect())
}

// ============================================================================
// Handlers
// ============================================================================

/// GetMergeRequest Handler
pub struct GetMergeRequestHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
}

impl GetMergeRequestHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
    ) -> Self {
        Self {
            user_repo,
            chapter_repo,
            merge_request_repo,
        }
    }

    pub async fn handle(&self, query: GetMergeRequest) -> Result<MergeRequestView, ApplicationError> {
        let request = self
            .merge_request_repo
            .find_by_id(query.merge_request_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("MergeRequest", query.merge_request_id))?;

        let mut views = enrich_requests(
            self.user_repo.as_ref(),
            self.chapter_repo.as_ref(),
            vec![request],
        )
        .await?;

        views
            .pop()
            .ok_or_else(|| ApplicationError::internal("合并请求视图为空"))
    }
}

/// ListMergeRequests Handler
pub struct ListMergeRequestsHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
}

impl ListMergeRequestsHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
    ) -> Self {
        Self {
            user_repo,
            novel_repo,
            chapter_repo,
            merge_request_repo,
        }
    }

    pub async fn handle(
        &self,
        query: ListMergeRequests,
    ) -> Result<Vec<MergeRequestView>, ApplicationError> {
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let requests = self.merge_request_repo.find_by_novel(query.novel_id).await?;

        enrich_requests(self.user_repo.as_ref(), self.chapter_repo.as_ref(), requests).await
    }
}

/// CheckSubmission Handler
pub struct CheckSubmissionHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
}

impl CheckSubmissionHandler {
    pub fn new(
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
    ) -> Self {
        Self {
            chapter_repo,
            merge_request_repo,
        }
    }

    pub async fn handle(&self, query: CheckSubmission) -> Result<SubmissionView, ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(query.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id))?;

        let has_pending = self.merge_request_repo.has_pending(query.chapter_id).await?;

        Ok(SubmissionView::from(SubmitEligibility::evaluate(
            &chapter,
            &query.actor,
            has_pending,
        )))
    }
}
