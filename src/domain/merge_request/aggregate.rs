//! Merge Request Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MergeRequestError, MergeRequestId, MergeStatus};
use crate::domain::chapter::ChapterId;
use crate::domain::novel::NovelId;
use crate::domain::user::UserId;

/// MergeRequest 聚合根
///
/// 不变量:
/// - 状态只能单向迁移：pending -> approved | rejected，终态不可再变
/// - reviewed_at 当且仅当状态离开 pending 时被设置
/// - 同一分支章节同一时刻最多一个 pending 请求（由持久化层的唯一约束保证）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    id: MergeRequestId,
    from_chapter_id: ChapterId,
    to_novel_id: NovelId,
    status: MergeStatus,
    requested_by: UserId,
    review_comment: Option<String>,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
}

impl MergeRequest {
    /// 提交新的合并请求（pending）
    pub fn submit(
        from_chapter_id: ChapterId,
        to_novel_id: NovelId,
        requested_by: UserId,
        review_comment: Option<String>,
    ) -> Self {
        Self {
            id: MergeRequestId::new(),
            from_chapter_id,
            to_novel_id,
            status: MergeStatus::Pending,
            requested_by,
            review_comment: normalize_comment(review_comment),
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }

    /// 从持久化数据重建，校验 status 与 reviewed_at 的一致性
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: MergeRequestId,
        from_chapter_id: ChapterId,
        to_novel_id: NovelId,
        status: MergeStatus,
        requested_by: UserId,
        review_comment: Option<String>,
        created_at: DateTime<Utc>,
        reviewed_at: Option<DateTime<Utc>>,
    ) -> Result<Self, MergeRequestError> {
        if status.is_terminal() != reviewed_at.is_some() {
            return Err(MergeRequestError::Inconsistent(format!(
                "合并请求 {} 状态为 {}，但 reviewed_at 为 {:?}",
                id, status, reviewed_at
            )));
        }
        Ok(Self {
            id,
            from_chapter_id,
            to_novel_id,
            status,
            requested_by,
            review_comment,
            created_at,
            reviewed_at,
        })
    }

    /// 接纳
    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<(), MergeRequestError> {
        self.status = self.status.transition_to(MergeStatus::Approved)?;
        self.reviewed_at = Some(now);
        Ok(())
    }

    /// 拒绝，附带的审核意见覆盖提交时的说明
    pub fn reject(
        &mut self,
        now: DateTime<Utc>,
        review_comment: Option<String>,
    ) -> Result<(), MergeRequestError> {
        self.status = self.status.transition_to(MergeStatus::Rejected)?;
        self.reviewed_at = Some(now);
        if let Some(comment) = normalize_comment(review_comment) {
            self.review_comment = Some(comment);
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == MergeStatus::Pending
    }

    // Getters
    pub fn id(&self) -> &MergeRequestId {
        &self.id
    }

    pub fn from_chapter_id(&self) -> &ChapterId {
        &self.from_chapter_id
    }

    pub fn to_novel_id(&self) -> &NovelId {
        &self.to_novel_id
    }

    pub fn status(&self) -> MergeStatus {
        self.status
    }

    pub fn requested_by(&self) -> &UserId {
        &self.requested_by
    }

    pub fn review_comment(&self) -> Option<&str> {
        self.review_comment.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }
}

fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> MergeRequest {
        MergeRequest::submit(
            ChapterId::new(),
            NovelId::new(),
            UserId::new(),
            Some("请审阅".to_string()),
        )
    }

    #[test]
    fn test_submit_starts_pending() {
        let request = pending();
        assert_eq!(request.status(), MergeStatus::Pending);
        assert!(request.reviewed_at().is_none());
        assert_eq!(request.review_comment(), Some("请审阅"));
    }

    #[test]
    fn test_approve_sets_reviewed_at() {
        let mut request = pending();
        let now = Utc::now();

        request.approve(now).unwrap();

        assert_eq!(request.status(), MergeStatus::Approved);
        assert_eq!(request.reviewed_at(), Some(now));
    }

    #[test]
    fn test_second_review_fails_without_change() {
        let mut request = pending();
        let first = Utc::now();
        request.approve(first).unwrap();

        let later = first + chrono::Duration::seconds(5);
        assert!(request.approve(later).is_err());
        assert!(request.reject(later, Some("太晚了".to_string())).is_err());

        assert_eq!(request.status(), MergeStatus::Approved);
        assert_eq!(request.reviewed_at(), Some(first));
        assert_eq!(request.review_comment(), Some("请审阅"));
    }

    #[test]
    fn test_reject_overrides_comment_only_when_given() {
        let mut request = pending();
        request.reject(Utc::now(), None).unwrap();
        assert_eq!(request.review_comment(), Some("请审阅"));

        let mut request = pending();
        request
            .reject(Utc::now(), Some("情节冲突".to_string()))
            .unwrap();
        assert_eq!(request.status(), MergeStatus::Rejected);
        assert_eq!(request.review_comment(), Some("情节冲突"));
    }

    #[test]
    fn test_restore_rejects_inconsistent_review_time() {
        let result = MergeRequest::restore(
            MergeRequestId::new(),
            ChapterId::new(),
            NovelId::new(),
            MergeStatus::Approved,
            UserId::new(),
            None,
            Utc::now(),
            None,
        );
        assert!(result.is_err());

        let result = MergeRequest::restore(
            MergeRequestId::new(),
            ChapterId::new(),
            NovelId::new(),
            MergeStatus::Pending,
            UserId::new(),
            None,
            Utc::now(),
            Some(Utc::now()),
        );
        assert!(result.is_err());
    }
}
