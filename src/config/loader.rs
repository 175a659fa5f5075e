//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use axum::http::HeaderName;
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "NOVELFORK";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NOVELFORK_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NOVELFORK_SERVER__PORT=8080`
/// - `NOVELFORK_DATABASE__PATH=/data/novelfork.db`
/// - `NOVELFORK_AUTH__USER_HEADER=x-forwarded-user`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时在当前目录搜索 config.toml / config.local.toml
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = with_defaults(Config::builder(), &AppConfig::default())?;

    builder = match config_path {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => CONFIG_FILE_NAMES.iter().fold(builder, |builder, name| {
            builder.add_source(File::with_name(name).required(false))
        }),
    };

    // 环境变量优先级最高，名称会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let app_config: AppConfig = builder
        .build()?
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    app_config.validate()?;
    Ok(app_config)
}

/// 以结构体默认值作为最低优先级来源
fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
    defaults: &AppConfig,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder
        .set_default("server.host", defaults.server.host.as_str())?
        .set_default("server.port", i64::from(defaults.server.port))?
        .set_default("database.path", defaults.database.path.as_str())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.user_header", defaults.auth.user_header.as_str())?
        .set_default(
            "events.channel_capacity",
            defaults.events.channel_capacity as i64,
        )?
        .set_default("log.level", defaults.log.level.as_str())?
        .set_default("log.json", defaults.log.json)?)
}

impl AppConfig {
    /// 校验跨字段约束，失败时返回第一条违反的规则
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if self.server.port == 0 {
            return invalid("server.port cannot be 0".into());
        }
        if self.database.path.trim().is_empty() {
            return invalid("database.path cannot be empty".into());
        }
        if self.database.max_connections == 0 {
            return invalid("database.max_connections cannot be 0".into());
        }
        if HeaderName::from_bytes(self.auth.user_header.trim().as_bytes()).is_err() {
            return invalid(format!(
                "auth.user_header is not a valid header name: {:?}",
                self.auth.user_header
            ));
        }
        if self.events.channel_capacity == 0 {
            return invalid("events.channel_capacity cannot be 0".into());
        }
        Ok(())
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("User Header: {}", config.auth.user_header);
    tracing::info!("Event Channel Capacity: {}", config.events.channel_capacity);
    tracing::info!("Log Level: {} (json: {})", config.log.level, config.log.json);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_error_for_bad_user_header() {
        let mut config = AppConfig::default();
        config.auth.user_header = "x user id".to_string();
        assert!(config.validate().is_err());

        config.auth.user_header = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_error_for_zero_channel_capacity() {
        let mut config = AppConfig::default();
        config.events.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[database]
path = "/tmp/novelfork-test.db"

[auth]
user_header = "x-forwarded-user"

[log]
json = true
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.path, "/tmp/novelfork-test.db");
        assert_eq!(config.auth.user_header, "x-forwarded-user");
        assert_eq!(config.events.channel_capacity, 100);
        assert!(config.log.json);
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[events]\nchannel_capacity = 0").unwrap();

        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
