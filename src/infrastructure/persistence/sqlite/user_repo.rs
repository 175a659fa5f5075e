//! SQLite User Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::{format_time, map_write_error, parse_time, parse_uuid, placeholders, DbPool};
use crate::application::ports::{RepositoryError, UserRepositoryPort};
use crate::domain::user::{Email, User, UserId, Username};

/// SQLite User Repository
pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::restore(
            UserId::from_uuid(parse_uuid(&row.id)?),
            Username::new(row.username)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            Email::new(row.email).map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            parse_time(&row.created_at)?,
        ))
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (id, username, email, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id().to_string())
            .bind(user.username().as_str())
            .bind(user.email().as_str())
            .bind(format_time(user.created_at()))
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, email, created_at FROM users WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT id, username, email, created_at FROM users WHERE id IN ({})",
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, UserRow>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn setup() -> SqliteUserRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteUserRepository::new(pool)
    }

    fn user(name: &str) -> User {
        User::register(
            Username::new(name).unwrap(),
            Email::new(format!("{name}@example.com")).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = setup().await;
        let alice = user("alice");
        repo.insert(&alice).await.unwrap();

        let found = repo.find_by_id(*alice.id()).await.unwrap().unwrap();
        assert_eq!(found.username().as_str(), "alice");
        assert_eq!(found.email().as_str(), "alice@example.com");

        assert!(repo.find_by_id(UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let repo = setup().await;
        repo.insert(&user("alice")).await.unwrap();

        let err = repo.insert(&user("alice")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_find_by_ids() {
        let repo = setup().await;
        let alice = user("alice");
        let bob = user("bob");
        repo.insert(&alice).await.unwrap();
        repo.insert(&bob).await.unwrap();

        let found = repo
            .find_by_ids(&[*alice.id(), *bob.id(), UserId::new()])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(repo.find_by_ids(&[]).await.unwrap().is_empty());
    }
}
