//! Novel Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::NovelRepositoryPort;
use crate::application::queries::{GetNovel, ListNovels};
use crate::domain::novel::Novel;

const DEFAULT_PAGE_LIMIT: usize = 100;

/// 小说视图
#[derive(Debug, Clone)]
pub struct NovelView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Novel> for NovelView {
    fn from(novel: Novel) -> Self {
        Self {
            id: *novel.id().as_uuid(),
            title: novel.title().as_str().to_string(),
            description: novel.description().map(str::to_string),
            author_id: *novel.author_id().as_uuid(),
            created_at: novel.created_at(),
            updated_at: novel.updated_at(),
        }
    }
}

/// GetNovel Handler
pub struct GetNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl GetNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, query: GetNovel) -> Result<NovelView, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        Ok(NovelView::from(novel))
    }
}

/// ListNovels Handler
pub struct ListNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl ListNovelsHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, query: ListNovels) -> Result<Vec<NovelView>, ApplicationError> {
        let offset = query.skip.unwrap_or(0);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        let novels = self.novel_repo.find_page(offset, limit).await?;
        Ok(novels.into_iter().map(NovelView::from).collect())
    }
}
