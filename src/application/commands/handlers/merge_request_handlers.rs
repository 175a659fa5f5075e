//! Merge Request Command Handlers
//!
//! 提交与审核都以持久化层的原子操作收尾，
//! 这里的检查只用于给出明确的错误信息，并发下的最终裁决在仓储中完成

use chrono::Utc;
use std::sync::Arc;

use crate::application::commands::{ApproveMergeRequest, RejectMergeRequest, SubmitMergeRequest};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, MergeRequestRepositoryPort, NovelRepositoryPort, RepositoryError,
};
use crate::domain::chapter::ChapterId;
use crate::domain::merge_request::{MergeRequest, MergeRequestId, SubmitBlocker, SubmitEligibility};
use crate::domain::user::UserId;

// ============================================================================
// SubmitMergeRequest
// ============================================================================

/// SubmitMergeRequest Handler
pub struct SubmitMergeRequestHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
}

impl SubmitMergeRequestHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            merge_request_repo,
        }
    }

    pub async fn handle(&self, command: SubmitMergeRequest) -> Result<MergeRequest, ApplicationError> {
        self.novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        let chapter = self
            .chapter_repo
            .find_by_id(command.from_chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.from_chapter_id))?;

        if *chapter.novel_id() != command.novel_id {
            return Err(ApplicationError::validation("分支章节不属于该小说"));
        }

        let has_pending = self
            .merge_request_repo
            .has_pending(command.from_chapter_id)
            .await?;

        let eligibility = SubmitEligibility::evaluate(&chapter, &command.requester, has_pending);
        match eligibility.blocker() {
            None => {}
            Some(SubmitBlocker::NotForkAuthor) => {
                return Err(ApplicationError::forbidden(SubmitBlocker::NotForkAuthor.reason()))
            }
            Some(blocker) => return Err(ApplicationError::conflict(blocker.reason())),
        }

        let request = MergeRequest::submit(
            command.from_chapter_id,
            command.novel_id,
            command.requester,
            command.review_comment,
        );

        // 并发提交时由唯一约束裁决，落败方得到冲突
        match self.merge_request_repo.insert_pending(&request).await {
            Ok(()) => {}
            Err(RepositoryError::Duplicate(_)) => {
                return Err(ApplicationError::conflict(
                    SubmitBlocker::PendingReview.reason(),
                ))
            }
            Err(RepositoryError::PreconditionFailed(_)) => {
                return Err(self
                    .explain_rejected_insert(command.from_chapter_id, &command.requester)
                    .await)
            }
            Err(other) => return Err(other.into()),
        }

        tracing::info!(
            merge_request_id = %request.id(),
            from_chapter_id = %request.from_chapter_id(),
            novel_id = %request.to_novel_id(),
            "Merge request submitted"
        );

        Ok(request)
    }

    /// 章节在检查之后被改变（例如已被接纳），按当前状态重新给出原因
    async fn explain_rejected_insert(
        &self,
        chapter_id: ChapterId,
        requester: &UserId,
    ) -> ApplicationError {
        let current = match self.chapter_repo.find_by_id(chapter_id).await {
            Ok(Some(chapter)) => chapter,
            Ok(None) => return ApplicationError::not_found("Chapter", chapter_id),
            Err(e) => return e.into(),
        };

        match SubmitEligibility::evaluate(&current, requester, false).blocker() {
            Some(SubmitBlocker::NotForkAuthor) => {
                ApplicationError::forbidden(SubmitBlocker::NotForkAuthor.reason())
            }
            Some(blocker) => ApplicationError::conflict(blocker.reason()),
            None => ApplicationError::conflict(SubmitBlocker::NotAFork.reason()),
        }
    }
}

// ============================================================================
// Review (Approve / Reject)
// ============================================================================

/// 加载待审核的请求及其目标小说，并校验审核人是小说作者
async fn load_for_review(
    novel_repo: &dyn NovelRepositoryPort,
    merge_request_repo: &dyn MergeRequestRepositoryPort,
    merge_request_id: MergeRequestId,
    reviewer: &UserId,
) -> Result<MergeRequest, ApplicationError> {
    let request = merge_request_repo
        .find_by_id(merge_request_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("MergeRequest", merge_request_id))?;

    let novel = novel_repo
        .find_by_id(*request.to_novel_id())
        .await?
        .ok_or_else(|| ApplicationError::not_found("Novel", request.to_novel_id()))?;

    novel.ensure_owner(reviewer)?;

    Ok(request)
}

/// ApproveMergeRequest Handler
pub struct ApproveMergeRequestHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
}

impl ApproveMergeRequestHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
            merge_request_repo,
        }
    }

    pub async fn handle(&self, command: ApproveMergeRequest) -> Result<MergeRequest, ApplicationError> {
        let mut request = load_for_review(
            self.novel_repo.as_ref(),
            self.merge_request_repo.as_ref(),
            command.merge_request_id,
            &command.reviewer,
        )
        .await?;

        request.approve(Utc::now())?;

        let mut chapter = self
            .chapter_repo
            .find_by_id(*request.from_chapter_id())
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", request.from_chapter_id()))?;
        chapter.promote_to_merged()?;

        // 状态迁移与章节晋升在同一事务中提交，数据库中的条件更新做最终裁决
        self.merge_request_repo.commit_review(&request).await?;

        tracing::info!(
            merge_request_id = %request.id(),
            from_chapter_id = %request.from_chapter_id(),
            reviewer = %command.reviewer,
            "Merge request approved"
        );

        Ok(request)
    }
}

/// RejectMergeRequest Handler
pub struct RejectMergeRequestHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
}

impl RejectMergeRequestHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        merge_request_repo: Arc<dyn MergeRequestRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            merge_request_repo,
        }
    }

    pub async fn handle(&self, command: RejectMergeRequest) -> Result<MergeRequest, ApplicationError> {
        let mut request = load_for_review(
            self.novel_repo.as_ref(),
            self.merge_request_repo.as_ref(),
            command.merge_request_id,
            &command.reviewer,
        )
        .await?;

        request.reject(Utc::now(), command.review_comment)?;

        self.merge_request_repo.commit_review(&request).await?;

        tracing::info!(
            merge_request_id = %request.id(),
            from_chapter_id = %request.from_chapter_id(),
            reviewer = %command.reviewer,
            "Merge request rejected"
        );

        Ok(request)
    }
}
