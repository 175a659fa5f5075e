//! Chapter Command Handlers

use std::sync::Arc;

use crate::application::commands::{CreateMainChapter, DeleteChapter, ForkChapter, UpdateChapter};
use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRepositoryPort, NovelRepositoryPort};
use crate::domain::chapter::{Chapter, ChapterContent, ChapterNumber};
use crate::domain::novel::Title;

fn parse_title_and_content(
    title: String,
    content: String,
) -> Result<(Title, ChapterContent), ApplicationError> {
    let title = Title::new(title).map_err(ApplicationError::validation)?;
    let content = ChapterContent::new(content).map_err(ApplicationError::validation)?;
    Ok((title, content))
}

// ============================================================================
// CreateMainChapter
// ============================================================================

/// CreateMainChapter Handler
pub struct CreateMainChapterHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl CreateMainChapterHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, command: CreateMainChapter) -> Result<Chapter, ApplicationError> {
        let (title, content) = parse_title_and_content(command.title, command.content)?;
        let number =
            ChapterNumber::new(command.chapter_number).map_err(ApplicationError::validation)?;

        let novel = self
            .novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        // 主线只能由小说作者续写
        novel.ensure_owner(&command.author)?;

        let chapter = Chapter::new_main(command.novel_id, command.author, title, content, number);
        self.chapter_repo.save(&chapter).await?;

        tracing::info!(
            chapter_id = %chapter.id(),
            novel_id = %chapter.novel_id(),
            chapter_number = chapter.number().value(),
            "Main chapter created"
        );

        Ok(chapter)
    }
}

// ============================================================================
// ForkChapter
// ============================================================================

/// ForkChapter Handler
pub struct ForkChapterHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ForkChapterHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(&self, command: ForkChapter) -> Result<Chapter, ApplicationError> {
        let (title, content) = parse_title_and_content(command.title, command.content)?;

        let source = self
            .chapter_repo
            .find_by_id(command.source_chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.source_chapter_id))?;

        let fork = Chapter::fork_from(&source, command.author, title, content);
        self.chapter_repo.save(&fork).await?;

        tracing::info!(
            chapter_id = %fork.id(),
            parent_chapter_id = %source.id(),
            author_id = %fork.author_id(),
            "Chapter forked"
        );

        Ok(fork)
    }
}

// ============================================================================
// UpdateChapter
// ============================================================================

/// UpdateChapter Handler
pub struct UpdateChapterHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl UpdateChapterHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(&self, command: UpdateChapter) -> Result<Chapter, ApplicationError> {
        let (title, content) = parse_title_and_content(command.title, command.content)?;

        let mut chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;

        chapter.ensure_author(&command.actor)?;
        chapter.revise(title, content);

        self.chapter_repo.save(&chapter).await?;

        tracing::info!(chapter_id = %chapter.id(), "Chapter updated");

        Ok(chapter)
    }
}

// ============================================================================
// DeleteChapter
// ============================================================================

/// DeleteChapter Handler
pub struct DeleteChapterHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl DeleteChapterHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(&self, command: DeleteChapter) -> Result<(), ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(command.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", command.chapter_id))?;

        chapter.ensure_author(&command.actor)?;

        // 子章节检查在删除事务内完成，仍有分支时得到 InvalidState
        self.chapter_repo.delete(command.chapter_id).await?;

        tracing::info!(chapter_id = %command.chapter_id, "Chapter deleted");

        Ok(())
    }
}
