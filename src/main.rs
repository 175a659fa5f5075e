//! NovelFork - 协作小说后端
//!
//! - Domain: novel/, chapter/, merge_request/, user/ (Bounded Contexts)
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, events

use std::sync::Arc;

use axum::http::HeaderName;
use novelfork::config::{load_config, print_config};
use novelfork::infrastructure::events::EventPublisher;
use novelfork::infrastructure::http::{AppState, HttpServer};
use novelfork::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
    SqliteMergeRequestRepository, SqliteNovelRepository, SqliteUserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},novelfork={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("NovelFork - 协作小说后端");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // 初始化数据库
    let db_config = DatabaseConfig::new(&config.database.path, config.database.max_connections);
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let novel_repo = Arc::new(SqliteNovelRepository::new(pool.clone()));
    let chapter_repo = Arc::new(SqliteChapterRepository::new(pool.clone()));
    let merge_request_repo = Arc::new(SqliteMergeRequestRepository::new(pool.clone()));

    // 创建事件发布器
    let event_publisher = Arc::new(EventPublisher::with_capacity(
        config.events.channel_capacity,
    ));

    let user_header = HeaderName::from_bytes(config.auth.user_header.trim().as_bytes())?;

    let state = AppState::new(
        user_repo,
        novel_repo,
        chapter_repo,
        merge_request_repo,
        event_publisher,
        user_header,
    );

    let server = HttpServer::new(config.server.clone(), state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}
