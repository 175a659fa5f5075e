//! SQLite Merge Request Repository
//!
//! 提交与审核各自是一个原子单元：
//! - 提交: 单条 `INSERT ... SELECT ... WHERE EXISTS`，配合 pending 部分唯一索引
//! - 审核: 条件更新请求状态，接纳时在同一事务中晋升来源章节

use async_trait::async_trait;
use sqlx::FromRow;

use super::chapter_repo::promote_to_merged_in;
use super::{format_time, map_write_error, parse_time, parse_uuid, DbPool};
use crate::application::ports::{MergeRequestRepositoryPort, RepositoryError};
use crate::domain::chapter::ChapterId;
use crate::domain::merge_request::{MergeRequest, MergeRequestId, MergeStatus};
use crate::domain::novel::NovelId;
use crate::domain::user::UserId;

/// SQLite Merge Request Repository
pub struct SqliteMergeRequestRepository {
    pool: DbPool,
}

impl SqliteMergeRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MergeRequestRow {
    id: String,
    from_chapter_id: String,
    to_novel_id: String,
    status: String,
    requested_by: String,
    review_comment: Option<String>,
    created_at: String,
    reviewed_at: Option<String>,
}

impl TryFrom<MergeRequestRow> for MergeRequest {
    type Error = RepositoryError;

    fn try_from(row: MergeRequestRow) -> Result<Self, Self::Error> {
        let status = MergeStatus::from_str(&row.status).ok_or_else(|| {
            RepositoryError::SerializationError(format!("unknown status: {}", row.status))
        })?;

        MergeRequest::restore(
            MergeRequestId::from_uuid(parse_uuid(&row.id)?),
            ChapterId::from_uuid(parse_uuid(&row.from_chapter_id)?),
            NovelId::from_uuid(parse_uuid(&row.to_novel_id)?),
            status,
            UserId::from_uuid(parse_uuid(&row.requested_by)?),
            row.review_comment,
            parse_time(&row.created_at)?,
            row.reviewed_at.as_deref().map(parse_time).transpose()?,
        )
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }
}

const MERGE_REQUEST_COLUMNS: &str =
    "id, from_chapter_id, to_novel_id, status, requested_by, review_comment, created_at, reviewed_at";

#[async_trait]
impl MergeRequestRepositoryPort for SqliteMergeRequestRepository {
    async fn insert_pending(&self, request: &MergeRequest) -> Result<(), RepositoryError> {
        if !request.is_pending() {
            return Err(RepositoryError::PreconditionFailed(format!(
                "只能插入 pending 状态的合并请求，当前为 {}",
                request.status()
            )));
        }

        // 检查与插入在同一条语句内完成
        let result = sqlx::query(
            r#"
            INSERT INTO merge_requests (id, from_chapter_id, to_novel_id, status, requested_by, review_comment, created_at, reviewed_at)
            SELECT ?, ?, ?, 'pending', ?, ?, ?, NULL
            WHERE EXISTS (
                SELECT 1 FROM chapters WHERE id = ? AND novel_id = ? AND branch_type = 'fork'
            )
            "#,
        )
        .bind(request.id().to_string())
        .bind(request.from_chapter_id().to_string())
        .bind(request.to_novel_id().to_string())
        .bind(request.requested_by().to_string())
        .bind(request.review_comment())
        .bind(format_time(request.created_at()))
        .bind(request.from_chapter_id().to_string())
        .bind(request.to_novel_id().to_string())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::PreconditionFailed(format!(
                "章节 {} 不是小说 {} 下的分支",
                request.from_chapter_id(),
                request.to_novel_id()
            )));
        }

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: MergeRequestId,
    ) -> Result<Option<MergeRequest>, RepositoryError> {
        let row: Option<MergeRequestRow> = sqlx::query_as(&format!(
            "SELECT {MERGE_REQUEST_COLUMNS} FROM merge_requests WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(MergeRequest::try_from).transpose()
    }

    async fn find_by_novel(&self, novel_id: NovelId) -> Result<Vec<MergeRequest>, RepositoryError> {
        let rows: Vec<MergeRequestRow> = sqlx::query_as(&format!(
            "SELECT {MERGE_REQUEST_COLUMNS} FROM merge_requests WHERE to_novel_id = ? ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(MergeRequest::try_from).collect()
    }

    async fn has_pending(&self, chapter_id: ChapterId) -> Result<bool, RepositoryError> {
        let (exists,): (i64,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM merge_requests WHERE from_chapter_id = ? AND status = 'pending')",
        )
        .bind(chapter_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(exists != 0)
    }

    async fn commit_review(&self, request: &MergeRequest) -> Result<(), RepositoryError> {
        if !request.status().is_terminal() {
            return Err(RepositoryError::PreconditionFailed(format!(
                "合并请求 {} 尚未审核",
                request.id()
            )));
        }
        let reviewed_at = request.reviewed_at().ok_or_else(|| {
            RepositoryError::PreconditionFailed(format!("合并请求 {} 缺少审核时间", request.id()))
        })?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE merge_requests
            SET status = ?, review_comment = ?, reviewed_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(request.status().as_str())
        .bind(request.review_comment())
        .bind(format_time(reviewed_at))
        .bind(request.id().to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 未提交的事务在 drop 时回滚
        if result.rows_affected() == 0 {
            return Err(RepositoryError::PreconditionFailed(format!(
                "合并请求 {} 已被审核或不存在",
                request.id()
            )));
        }

        if request.status() == MergeStatus::Approved {
            promote_to_merged_in(&mut tx, *request.from_chapter_id()).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(
            merge_request_id = %request.id(),
            status = %request.status(),
            "Merge request review committed"
        );

        Ok(())
    }
}
