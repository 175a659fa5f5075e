//! Novel Command Handlers

use std::sync::Arc;

use crate::application::commands::{CreateNovel, DeleteNovel, UpdateNovel};
use crate::application::error::ApplicationError;
use crate::application::ports::NovelRepositoryPort;
use crate::domain::novel::{Description, Novel, Title};

/// CreateNovel Handler
pub struct CreateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl CreateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: CreateNovel) -> Result<Novel, ApplicationError> {
        let title = Title::new(command.title).map_err(ApplicationError::validation)?;
        let novel = Novel::new(title, Description::parse(command.description), command.author);

        self.novel_repo.save(&novel).await?;

        tracing::info!(
            novel_id = %novel.id(),
            author_id = %novel.author_id(),
            title = %novel.title(),
            "Novel created"
        );

        Ok(novel)
    }
}

/// UpdateNovel Handler
pub struct UpdateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl UpdateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: UpdateNovel) -> Result<Novel, ApplicationError> {
        let title = Title::new(command.title).map_err(ApplicationError::validation)?;

        let mut novel = self
            .novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        novel.ensure_owner(&command.actor)?;
        novel.update(title, Description::parse(command.description));

        self.novel_repo.save(&novel).await?;

        tracing::info!(novel_id = %novel.id(), "Novel updated");

        Ok(novel)
    }
}

/// DeleteNovel Handler
pub struct DeleteNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl DeleteNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(&self, command: DeleteNovel) -> Result<(), ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(command.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", command.novel_id))?;

        novel.ensure_owner(&command.actor)?;

        // 章节与合并请求在同一事务中一并删除
        self.novel_repo.delete(command.novel_id).await?;

        tracing::info!(novel_id = %command.novel_id, "Novel deleted");

        Ok(())
    }
}
