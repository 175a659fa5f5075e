//! SQLite Chapter Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, SqliteConnection};

use super::{format_time, parse_time, parse_uuid, placeholders, DbPool};
use crate::application::ports::{ChapterRepositoryPort, RepositoryError};
use crate::domain::chapter::{BranchType, Chapter, ChapterContent, ChapterId, ChapterNumber, Lineage};
use crate::domain::novel::{NovelId, Title};
use crate::domain::user::UserId;

/// SQLite Chapter Repository
pub struct SqliteChapterRepository {
    pool: DbPool,
}

impl SqliteChapterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    novel_id: String,
    title: String,
    content: String,
    chapter_number: i64,
    parent_chapter_id: Option<String>,
    branch_type: String,
    author_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChapterRow> for Chapter {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        let branch_type = BranchType::from_str(&row.branch_type).ok_or_else(|| {
            RepositoryError::SerializationError(format!("unknown branch_type: {}", row.branch_type))
        })?;
        let parent = row
            .parent_chapter_id
            .as_deref()
            .map(parse_uuid)
            .transpose()?
            .map(ChapterId::from_uuid);
        let lineage = Lineage::from_parts(branch_type, parent)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        Ok(Chapter::restore(
            ChapterId::from_uuid(parse_uuid(&row.id)?),
            NovelId::from_uuid(parse_uuid(&row.novel_id)?),
            Title::new(row.title).map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            ChapterContent::new(row.content)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            ChapterNumber::new(row.chapter_number)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            UserId::from_uuid(parse_uuid(&row.author_id)?),
            lineage,
            parse_time(&row.created_at)?,
            parse_time(&row.updated_at)?,
        ))
    }
}

const CHAPTER_COLUMNS: &str = "id, novel_id, title, content, chapter_number, parent_chapter_id, branch_type, author_id, created_at, updated_at";

/// 在给定连接（可以是事务）上把 fork 晋升为 merged
///
/// 条件更新保证只有当前仍是 fork 的章节会被修改
pub(crate) async fn promote_to_merged_in(
    conn: &mut SqliteConnection,
    id: ChapterId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE chapters SET branch_type = 'merged', updated_at = ? WHERE id = ? AND branch_type = 'fork'",
    )
    .bind(format_time(Utc::now()))
    .bind(id.to_string())
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    if result.rows_affected() == 1 {
        tracing::debug!(chapter_id = %id, "Chapter promoted to merged");
        return Ok(());
    }

    let current: Option<(String,)> = sqlx::query_as("SELECT branch_type FROM chapters WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

    match current {
        None => Err(RepositoryError::NotFound {
            resource_type: "Chapter",
            id: id.to_string(),
        }),
        Some((branch_type,)) => Err(RepositoryError::PreconditionFailed(format!(
            "章节 {} 当前为 {}，不是分支",
            id, branch_type
        ))),
    }
}

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn save(&self, chapter: &Chapter) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, novel_id, title, content, chapter_number, parent_chapter_id, branch_type, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(chapter.id().to_string())
        .bind(chapter.novel_id().to_string())
        .bind(chapter.title().as_str())
        .bind(chapter.content().as_str())
        .bind(chapter.number().value())
        .bind(chapter.parent_chapter_id().map(|id| id.to_string()))
        .bind(chapter.branch_type().as_str())
        .bind(chapter.author_id().to_string())
        .bind(format_time(chapter.created_at()))
        .bind(format_time(chapter.updated_at()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: ChapterId) -> Result<Option<Chapter>, RepositoryError> {
        let row: Option<ChapterRow> =
            sqlx::query_as(&format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Chapter::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[ChapterId]) -> Result<Vec<Chapter>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id IN ({})",
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, ChapterRow>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Chapter::try_from).collect()
    }

    async fn find_by_novel(
        &self,
        novel_id: NovelId,
        branch_type: Option<BranchType>,
    ) -> Result<Vec<Chapter>, RepositoryError> {
        let rows: Vec<ChapterRow> = match branch_type {
            Some(branch_type) => sqlx::query_as(&format!(
                "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE novel_id = ? AND branch_type = ? ORDER BY chapter_number, created_at"
            ))
            .bind(novel_id.to_string())
            .bind(branch_type.as_str())
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query_as(&format!(
                "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE novel_id = ? ORDER BY chapter_number, created_at"
            ))
            .bind(novel_id.to_string())
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Chapter::try_from).collect()
    }

    async fn find_children(
        &self,
        parent_id: ChapterId,
        branch_type: BranchType,
    ) -> Result<Vec<Chapter>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE parent_chapter_id = ? AND branch_type = ? ORDER BY created_at"
        ))
        .bind(parent_id.to_string())
        .bind(branch_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Chapter::try_from).collect()
    }

    async fn delete(&self, id: ChapterId) -> Result<(), RepositoryError> {
        // 第一条语句即为写操作，事务立即持有写锁，
        // 子章节检查与删除之间不会插入新的分支
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query("DELETE FROM merge_requests WHERE from_chapter_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "DELETE FROM chapters WHERE id = ? AND NOT EXISTS (SELECT 1 FROM chapters WHERE parent_chapter_id = ?)",
        )
        .bind(id.to_string())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 未提交的事务在 drop 时回滚，已删除的合并请求随之恢复
        if result.rows_affected() == 0 {
            let (exists,): (i64,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM chapters WHERE id = ?)")
                    .bind(id.to_string())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

            return Err(if exists != 0 {
                RepositoryError::PreconditionFailed("章节下仍有分支，无法删除".to_string())
            } else {
                RepositoryError::NotFound {
                    resource_type: "Chapter",
                    id: id.to_string(),
                }
            });
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
