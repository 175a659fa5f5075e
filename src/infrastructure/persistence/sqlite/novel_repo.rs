//! SQLite Novel Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::{format_time, parse_time, parse_uuid, DbPool};
use crate::application::ports::{NovelRepositoryPort, RepositoryError};
use crate::domain::novel::{Description, Novel, NovelId, Title};
use crate::domain::user::UserId;

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NovelRow {
    id: String,
    title: String,
    description: Option<String>,
    author_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for Novel {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        Ok(Novel::restore(
            NovelId::from_uuid(parse_uuid(&row.id)?),
            Title::new(row.title).map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            Description::parse(row.description),
            UserId::from_uuid(parse_uuid(&row.author_id)?),
            parse_time(&row.created_at)?,
            parse_time(&row.updated_at)?,
        ))
    }
}

const NOVEL_COLUMNS: &str = "id, title, description, author_id, created_at, updated_at";

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn save(&self, novel: &Novel) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO novels (id, title, description, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(novel.id().to_string())
        .bind(novel.title().as_str())
        .bind(novel.description())
        .bind(novel.author_id().to_string())
        .bind(format_time(novel.created_at()))
        .bind(format_time(novel.updated_at()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: NovelId) -> Result<Option<Novel>, RepositoryError> {
        let row: Option<NovelRow> =
            sqlx::query_as(&format!("SELECT {NOVEL_COLUMNS} FROM novels WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Novel::try_from).transpose()
    }

    async fn find_page(&self, offset: usize, limit: usize) -> Result<Vec<Novel>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(&format!(
            "SELECT {NOVEL_COLUMNS} FROM novels ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Novel::try_from).collect()
    }

    async fn delete(&self, id: NovelId) -> Result<(), RepositoryError> {
        // 使用事务确保原子性
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除关联的 merge_requests
        sqlx::query(
            "DELETE FROM merge_requests WHERE to_novel_id = ? OR from_chapter_id IN (SELECT id FROM chapters WHERE novel_id = ?)",
        )
        .bind(id.to_string())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除关联的 chapters（自引用外键在语句结束时检查）
        sqlx::query("DELETE FROM chapters WHERE novel_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        // 删除 novel
        let result = sqlx::query("DELETE FROM novels WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                resource_type: "Novel",
                id: id.to_string(),
            });
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::UserRepositoryPort;
    use crate::domain::user::{Email, User, Username};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteUserRepository,
    };

    async fn setup() -> (SqliteNovelRepository, UserId) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let user = User::register(
            Username::new("author").unwrap(),
            Email::new("author@example.com").unwrap(),
        );
        SqliteUserRepository::new(pool.clone())
            .insert(&user)
            .await
            .unwrap();

        (SqliteNovelRepository::new(pool), *user.id())
    }

    fn novel(title: &str, author: UserId) -> Novel {
        Novel::new(Title::new(title).unwrap(), None, author)
    }

    #[tokio::test]
    async fn test_save_and_update() {
        let (repo, author) = setup().await;
        let mut n = novel("初稿", author);
        repo.save(&n).await.unwrap();

        n.update(
            Title::new("定稿").unwrap(),
            Description::parse(Some("简介".to_string())),
        );
        repo.save(&n).await.unwrap();

        let found = repo.find_by_id(*n.id()).await.unwrap().unwrap();
        assert_eq!(found.title().as_str(), "定稿");
        assert_eq!(found.description(), Some("简介"));
        assert_eq!(found.author_id(), &author);
    }

    #[tokio::test]
    async fn test_find_page_newest_first() {
        let (repo, author) = setup().await;
        let first = novel("第一本", author);
        repo.save(&first).await.unwrap();
        let second = novel("第二本", author);
        repo.save(&second).await.unwrap();

        let page = repo.find_page(0, 10).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id(), second.id());

        let page = repo.find_page(1, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id(), first.id());
    }

    #[tokio::test]
    async fn test_delete_missing_novel() {
        let (repo, _) = setup().await;
        let err = repo.delete(NovelId::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
