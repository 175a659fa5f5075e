//! Merge Request Context - 提交资格判定

use serde::Serialize;

use crate::domain::chapter::{BranchType, Chapter};
use crate::domain::user::UserId;

/// 阻止提交合并请求的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitBlocker {
    /// 章节不是分支
    NotAFork,
    /// 分支已被合并
    AlreadyMerged,
    /// 操作者不是分支作者
    NotForkAuthor,
    /// 已有等待审核的请求
    PendingReview,
}

impl SubmitBlocker {
    pub fn reason(&self) -> &'static str {
        match self {
            SubmitBlocker::NotAFork => "只有分支章节才能提交",
            SubmitBlocker::AlreadyMerged => "该分支已被接纳",
            SubmitBlocker::NotForkAuthor => "只有分支作者才能提交分支",
            SubmitBlocker::PendingReview => "该分支已经提交，等待审核中",
        }
    }
}

/// 提交资格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitEligibility {
    blocker: Option<SubmitBlocker>,
}

impl SubmitEligibility {
    /// 判定 `actor` 能否为 `chapter` 提交合并请求
    ///
    /// 检查顺序: 已合并 -> 非分支 -> 非作者 -> 已有 pending 请求
    pub fn evaluate(chapter: &Chapter, actor: &UserId, has_pending: bool) -> Self {
        let blocker = match chapter.branch_type() {
            BranchType::Merged => Some(SubmitBlocker::AlreadyMerged),
            BranchType::Main => Some(SubmitBlocker::NotAFork),
            BranchType::Fork if !chapter.is_authored_by(actor) => {
                Some(SubmitBlocker::NotForkAuthor)
            }
            BranchType::Fork if has_pending => Some(SubmitBlocker::PendingReview),
            BranchType::Fork => None,
        };
        Self { blocker }
    }

    pub fn can_submit(&self) -> bool {
        self.blocker.is_none()
    }

    pub fn blocker(&self) -> Option<SubmitBlocker> {
        self.blocker
    }

    pub fn reason(&self) -> Option<&'static str> {
        self.blocker.map(|b| b.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chapter::{ChapterContent, ChapterNumber};
    use crate::domain::novel::{NovelId, Title};

    fn main_chapter() -> Chapter {
        Chapter::new_main(
            NovelId::new(),
            UserId::new(),
            Title::new("第十章").unwrap(),
            ChapterContent::new("正文").unwrap(),
            ChapterNumber::new(10).unwrap(),
        )
    }

    fn fork_by(author: UserId) -> Chapter {
        Chapter::fork_from(
            &main_chapter(),
            author,
            Title::new("第十章 分支").unwrap(),
            ChapterContent::new("分支正文").unwrap(),
        )
    }

    #[test]
    fn test_main_chapter_cannot_be_submitted() {
        let chapter = main_chapter();
        let eligibility = SubmitEligibility::evaluate(&chapter, chapter.author_id(), false);

        assert!(!eligibility.can_submit());
        assert_eq!(eligibility.blocker(), Some(SubmitBlocker::NotAFork));
        assert_eq!(eligibility.reason(), Some("只有分支章节才能提交"));
    }

    #[test]
    fn test_fork_author_can_submit() {
        let author = UserId::new();
        let eligibility = SubmitEligibility::evaluate(&fork_by(author), &author, false);

        assert!(eligibility.can_submit());
        assert!(eligibility.reason().is_none());
    }

    #[test]
    fn test_other_user_cannot_submit_fork() {
        let fork = fork_by(UserId::new());
        let eligibility = SubmitEligibility::evaluate(&fork, &UserId::new(), false);

        assert_eq!(eligibility.blocker(), Some(SubmitBlocker::NotForkAuthor));
    }

    #[test]
    fn test_pending_request_blocks_resubmission() {
        let author = UserId::new();
        let eligibility = SubmitEligibility::evaluate(&fork_by(author), &author, true);

        assert_eq!(eligibility.blocker(), Some(SubmitBlocker::PendingReview));
    }

    #[test]
    fn test_merged_fork_reports_already_merged() {
        let author = UserId::new();
        let mut fork = fork_by(author);
        fork.promote_to_merged().unwrap();

        let eligibility = SubmitEligibility::evaluate(&fork, &author, false);
        assert_eq!(eligibility.blocker(), Some(SubmitBlocker::AlreadyMerged));
    }
}
