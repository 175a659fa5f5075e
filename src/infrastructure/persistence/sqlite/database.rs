//! SQLite Database - 数据库连接和迁移

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::application::ports::RepositoryError;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库连接 URL
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/novelfork.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>, max_connections: u32) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections,
        }
    }

    /// 内存数据库（测试用），单连接保证所有查询落在同一个库上
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
///
/// PRAGMA 通过连接选项设置，对池中每个连接都生效
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        // WAL 模式，允许并发读写
        .journal_mode(SqliteJournalMode::Wal)
        // 遇到锁时等待而不是立即失败
        .busy_timeout(Duration::from_millis(5000))
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.is_in_memory() {
        // 连接关闭后内存库即消失
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options.connect_with(options).await?;

    tracing::info!(
        max_connections = config.max_connections,
        "SQLite pool created with WAL mode, foreign keys and busy_timeout=5000ms"
    );

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    // 创建 users 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 novels 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS novels (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            author_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (author_id) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 chapters 表
    // 谱系约束: main 无父章节，fork / merged 必有父章节，且父章节属于同一本小说
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chapters (
            id TEXT PRIMARY KEY,
            novel_id TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            chapter_number INTEGER NOT NULL CHECK (chapter_number >= 1),
            parent_chapter_id TEXT,
            branch_type TEXT NOT NULL CHECK (branch_type IN ('main', 'fork', 'merged')),
            author_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (
                (branch_type = 'main' AND parent_chapter_id IS NULL)
                OR (branch_type IN ('fork', 'merged') AND parent_chapter_id IS NOT NULL)
            ),
            UNIQUE (id, novel_id),
            FOREIGN KEY (novel_id) REFERENCES novels(id),
            FOREIGN KEY (author_id) REFERENCES users(id),
            FOREIGN KEY (parent_chapter_id, novel_id) REFERENCES chapters(id, novel_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 创建 merge_requests 表
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS merge_requests (
            id TEXT PRIMARY KEY,
            from_chapter_id TEXT NOT NULL,
            to_novel_id TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected')),
            requested_by TEXT NOT NULL,
            review_comment TEXT,
            created_at TEXT NOT NULL,
            reviewed_at TEXT,
            CHECK ((status = 'pending') = (reviewed_at IS NULL)),
            FOREIGN KEY (from_chapter_id) REFERENCES chapters(id),
            FOREIGN KEY (to_novel_id) REFERENCES novels(id),
            FOREIGN KEY (requested_by) REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // 同一分支同一时刻最多一个 pending 请求
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS uq_merge_requests_pending_chapter
        ON merge_requests(from_chapter_id) WHERE status = 'pending'
        "#,
    )
    .execute(pool)
    .await?;

    // 创建索引
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_chapters_novel_number
        ON chapters(novel_id, chapter_number)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_chapters_parent
        ON chapters(parent_chapter_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_merge_requests_novel
        ON merge_requests(to_novel_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_novels_created_at
        ON novels(created_at)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

// ============================================================================
// 行映射辅助
// ============================================================================

/// 时间统一存为固定精度的 RFC3339 文本，保证按字符串排序即按时间排序
pub(crate) fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_time(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(value).map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// 写操作错误映射，唯一约束冲突单独识别
pub(crate) fn map_write_error(err: sqlx::Error) -> RepositoryError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Duplicate(db_err.message().to_string())
        }
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}

/// 生成 IN 子句的占位符
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_in_memory_db() {
        let config = DatabaseConfig::in_memory();
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        // 迁移可重复执行
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_lineage_check_constraint() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let now = format_time(Utc::now());
        sqlx::query("INSERT INTO users (id, username, email, created_at) VALUES ('u1', 'alice', 'a@x.io', ?)")
            .bind(&now)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO novels (id, title, author_id, created_at, updated_at) VALUES ('n1', 'T', 'u1', ?, ?)")
            .bind(&now)
            .bind(&now)
            .execute(&pool)
            .await
            .unwrap();

        // fork 没有父章节
        let result = sqlx::query(
            "INSERT INTO chapters (id, novel_id, title, content, chapter_number, parent_chapter_id, branch_type, author_id, created_at, updated_at) \
             VALUES ('c1', 'n1', 'T', 'body', 1, NULL, 'fork', 'u1', ?, ?)",
        )
        .bind(&now)
        .bind(&now)
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_time_format_is_sortable() {
        let earlier = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(format_time(earlier) < format_time(later));
        assert_eq!(parse_time(&format_time(later)).unwrap(), later);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(3), "?, ?, ?");
        assert_eq!(placeholders(1), "?");
    }
}
