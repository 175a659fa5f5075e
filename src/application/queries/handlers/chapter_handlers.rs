//! Chapter Query Handlers
//!
//! 章节读模型在领域数据之外补充作者用户名和父章节标题

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRepositoryPort, NovelRepositoryPort, UserRepositoryPort};
use crate::application::queries::{GetChapter, ListForks, ListMergedChildren, ListNovelChapters};
use crate::domain::chapter::{BranchType, Chapter, ChapterId};
use crate::domain::user::UserId;

// ============================================================================
// Views
// ============================================================================

/// 章节视图
#[derive(Debug, Clone)]
pub struct ChapterView {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub title: String,
    pub content: String,
    pub chapter_number: i64,
    pub parent_chapter_id: Option<Uuid>,
    pub branch_type: BranchType,
    pub author_id: Uuid,
    pub author_username: Option<String>,
    pub parent_chapter_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Chapter> for ChapterView {
    fn from(chapter: Chapter) -> Self {
        Self {
            id: *chapter.id().as_uuid(),
            novel_id: *chapter.novel_id().as_uuid(),
            title: chapter.title().as_str().to_string(),
            content: chapter.content().as_str().to_string(),
            chapter_number: chapter.number().value(),
            parent_chapter_id: chapter.parent_chapter_id().map(|id| *id.as_uuid()),
            branch_type: chapter.branch_type(),
            author_id: *chapter.author_id().as_uuid(),
            author_username: None,
            parent_chapter_title: None,
            created_at: chapter.created_at(),
            updated_at: chapter.updated_at(),
        }
    }
}

/// 批量补全作者用户名和父章节标题
async fn enrich_chapters(
    user_repo: &dyn UserRepositoryPort,
    chapter_repo: &dyn ChapterRepositoryPort,
    chapters: Vec<Chapter>,
) -> Result<Vec<ChapterView>, ApplicationError> {
    let mut author_ids: Vec<UserId> = chapters.iter().map(|c| *c.author_id()).collect();
    author_ids.sort_by_key(|id| *id.as_uuid());
    author_ids.dedup();

    let mut parent_ids: Vec<ChapterId> = chapters
        .iter()
        .filter_map(|c| c.parent_chapter_id())
        .collect();
    parent_ids.sort_by_key(|id| *id.as_uuid());
    parent_ids.dedup();

    let usernames: HashMap<UserId, String> = user_repo
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (*u.id(), u.username().as_str().to_string()))
        .collect();

    let parent_titles: HashMap<ChapterId, String> = if parent_ids.is_empty() {
        HashMap::new()
    } else {
        chapter_repo
            .find_by_ids(&parent_ids)
            .await?
            .into_iter()
            .map(|c| (*c.id(), c.title().as_str().to_string()))
            .collect()
    };

    Ok(chapters
        .into_iter()
        .map(|chapter| {
            let author_username = usernames.get(chapter.author_id()).cloned();
            let parent_chapter_title = chapter
                .parent_chapter_id()
                .and_then(|id| parent_titles.get(&id).cloned());

            let mut view = ChapterView::from(chapter);
            view.author_username = author_username;
            view.parent_chapter_title = parent_chapter_title;
            view
        })
        .collect())
}

// ============================================================================
// Handlers
// ============================================================================

/// GetChapter Handler
pub struct GetChapterHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl GetChapterHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            user_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: GetChapter) -> Result<ChapterView, ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(query.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id))?;

        let mut views = enrich_chapters(
            self.user_repo.as_ref(),
            self.chapter_repo.as_ref(),
            vec![chapter],
        )
        .await?;

        views
            .pop()
            .ok_or_else(|| ApplicationError::internal("章节视图为空"))
    }
}

/// ListNovelChapters Handler
pub struct ListNovelChaptersHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListNovelChaptersHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            user_repo,
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: ListNovelChapters) -> Result<Vec<ChapterView>, ApplicationError> {
        self.novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        let chapters = self
            .chapter_repo
            .find_by_novel(query.novel_id, query.branch_type)
            .await?;

        enrich_chapters(self.user_repo.as_ref(), self.chapter_repo.as_ref(), chapters).await
    }
}

/// 列出某章节下指定类型的子章节
async fn list_children(
    user_repo: &dyn UserRepositoryPort,
    chapter_repo: &dyn ChapterRepositoryPort,
    chapter_id: ChapterId,
    branch_type: BranchType,
) -> Result<Vec<ChapterView>, ApplicationError> {
    chapter_repo
        .find_by_id(chapter_id)
        .await?
        .ok_or_else(|| ApplicationError::not_found("Chapter", chapter_id))?;

    let children = chapter_repo.find_children(chapter_id, branch_type).await?;
    enrich_chapters(user_repo, chapter_repo, children).await
}

/// ListForks Handler
pub struct ListForksHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListForksHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            user_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: ListForks) -> Result<Vec<ChapterView>, ApplicationError> {
        list_children(
            self.user_repo.as_ref(),
            self.chapter_repo.as_ref(),
            query.chapter_id,
            BranchType::Fork,
        )
        .await
    }
}

/// ListMergedChildren Handler
pub struct ListMergedChildrenHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListMergedChildrenHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            user_repo,
            chapter_repo,
        }
    }

    pub async fn handle(
        &self,
        query: ListMergedChildren,
    ) -> Result<Vec<ChapterView>, ApplicationError> {
        list_children(
            self.user_repo.as_ref(),
            self.chapter_repo.as_ref(),
            query.chapter_id,
            BranchType::Merged,
        )
        .await
    }
}
