//! Chapter Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BranchType, ChapterContent, ChapterError, ChapterId, ChapterNumber, Lineage};
use crate::domain::novel::{NovelId, Title};
use crate::domain::user::UserId;

/// Chapter 聚合根
///
/// 不变量:
/// - main 章节没有父章节，fork / merged 章节必有父章节（由 `Lineage` 保证）
/// - 父章节与本章节属于同一本小说（分支只能通过 `fork_from` 产生）
/// - fork -> merged 是唯一允许的谱系变化，且只能由合并请求审批触发
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    id: ChapterId,
    novel_id: NovelId,
    title: Title,
    content: ChapterContent,
    number: ChapterNumber,
    author_id: UserId,
    lineage: Lineage,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Chapter {
    /// 创建主线章节
    pub fn new_main(
        novel_id: NovelId,
        author_id: UserId,
        title: Title,
        content: ChapterContent,
        number: ChapterNumber,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ChapterId::new(),
            novel_id,
            title,
            content,
            number,
            author_id,
            lineage: Lineage::Main,
            created_at: now,
            updated_at: now,
        }
    }

    /// 从已有章节创建分支
    ///
    /// 分支继承源章节的小说和章节序号
    pub fn fork_from(
        source: &Chapter,
        author_id: UserId,
        title: Title,
        content: ChapterContent,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ChapterId::new(),
            novel_id: source.novel_id,
            title,
            content,
            number: source.number,
            author_id,
            lineage: Lineage::Fork { parent: source.id },
            created_at: now,
            updated_at: now,
        }
    }

    /// 从持久化数据重建
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ChapterId,
        novel_id: NovelId,
        title: Title,
        content: ChapterContent,
        number: ChapterNumber,
        author_id: UserId,
        lineage: Lineage,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            novel_id,
            title,
            content,
            number,
            author_id,
            lineage,
            created_at,
            updated_at,
        }
    }

    /// fork -> merged
    pub fn promote_to_merged(&mut self) -> Result<(), ChapterError> {
        match self.lineage {
            Lineage::Fork { parent } => {
                self.lineage = Lineage::Merged { parent };
                self.updated_at = Utc::now();
                Ok(())
            }
            other => Err(ChapterError::NotAFork {
                chapter_id: self.id,
                branch_type: other.branch_type(),
            }),
        }
    }

    /// 修改标题和正文，谱系不受影响
    pub fn revise(&mut self, title: Title, content: ChapterContent) {
        self.title = title;
        self.content = content;
        self.updated_at = Utc::now();
    }

    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        self.author_id == *user_id
    }

    /// 校验操作者是否为章节作者
    pub fn ensure_author(&self, user_id: &UserId) -> Result<(), ChapterError> {
        if self.is_authored_by(user_id) {
            Ok(())
        } else {
            Err(ChapterError::NotAuthor {
                chapter_id: self.id,
                user_id: *user_id,
            })
        }
    }

    // Getters
    pub fn id(&self) -> &ChapterId {
        &self.id
    }

    pub fn novel_id(&self) -> &NovelId {
        &self.novel_id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn content(&self) -> &ChapterContent {
        &self.content
    }

    pub fn number(&self) -> ChapterNumber {
        self.number
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn lineage(&self) -> Lineage {
        self.lineage
    }

    pub fn branch_type(&self) -> BranchType {
        self.lineage.branch_type()
    }

    pub fn parent_chapter_id(&self) -> Option<ChapterId> {
        self.lineage.parent()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_chapter(number: i64) -> Chapter {
        Chapter::new_main(
            NovelId::new(),
            UserId::new(),
            Title::new("第一章").unwrap(),
            ChapterContent::new("很久很久以前").unwrap(),
            ChapterNumber::new(number).unwrap(),
        )
    }

    #[test]
    fn test_main_chapter_has_no_parent() {
        let chapter = main_chapter(1);
        assert_eq!(chapter.branch_type(), BranchType::Main);
        assert!(chapter.parent_chapter_id().is_none());
    }

    #[test]
    fn test_fork_copies_novel_and_number() {
        let source = main_chapter(10);
        let reader = UserId::new();
        let fork = Chapter::fork_from(
            &source,
            reader,
            Title::new("第十章（另一种结局）").unwrap(),
            ChapterContent::new("另一个故事").unwrap(),
        );

        assert_eq!(fork.branch_type(), BranchType::Fork);
        assert_eq!(fork.parent_chapter_id(), Some(*source.id()));
        assert_eq!(fork.novel_id(), source.novel_id());
        assert_eq!(fork.number(), source.number());
        assert!(fork.is_authored_by(&reader));
        assert!(!fork.is_authored_by(source.author_id()));
    }

    #[test]
    fn test_promote_fork_to_merged_keeps_parent() {
        let source = main_chapter(3);
        let mut fork = Chapter::fork_from(
            &source,
            UserId::new(),
            Title::new("分支").unwrap(),
            ChapterContent::new("内容").unwrap(),
        );

        fork.promote_to_merged().unwrap();

        assert_eq!(fork.branch_type(), BranchType::Merged);
        assert_eq!(fork.parent_chapter_id(), Some(*source.id()));
    }

    #[test]
    fn test_promote_rejects_non_fork() {
        let mut chapter = main_chapter(1);
        assert!(matches!(
            chapter.promote_to_merged(),
            Err(ChapterError::NotAFork {
                branch_type: BranchType::Main,
                ..
            })
        ));

        let source = main_chapter(2);
        let mut fork = Chapter::fork_from(
            &source,
            UserId::new(),
            Title::new("分支").unwrap(),
            ChapterContent::new("内容").unwrap(),
        );
        fork.promote_to_merged().unwrap();
        assert!(matches!(
            fork.promote_to_merged(),
            Err(ChapterError::NotAFork {
                branch_type: BranchType::Merged,
                ..
            })
        ));
    }

    #[test]
    fn test_revise_keeps_lineage() {
        let mut chapter = main_chapter(1);
        chapter.revise(
            Title::new("改过的标题").unwrap(),
            ChapterContent::new("改过的正文").unwrap(),
        );
        assert_eq!(chapter.title().as_str(), "改过的标题");
        assert_eq!(chapter.lineage(), Lineage::Main);
    }
}
