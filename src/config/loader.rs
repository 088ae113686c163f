//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, DocumentBackend, DEV_JWT_SECRET};

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

/// HS256 密钥最短长度（字节）
const MIN_SECRET_LEN: usize = 32;

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `BOOKSTORE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `BOOKSTORE_SERVER__PORT=8080`
/// - `BOOKSTORE_DATABASE__PATH=/data/bookstore.db`
/// - `BOOKSTORE_DOCUMENT_STORE__URI=mongodb://mongo:27017`
/// - `BOOKSTORE_AUTH__JWT_SECRET=...`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("server.max_body_size", 10 * 1024 * 1024)?
        .set_default("database.path", "data/bookstore.db")?
        .set_default("database.max_connections", 5)?
        .set_default("document_store.backend", "mongo")?
        .set_default("document_store.uri", "mongodb://localhost:27017")?
        .set_default("document_store.database", "bookstore")?
        .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
        .set_default("auth.issuer", "bookstore-api")?
        .set_default("auth.token_expiry_secs", 3600)?
        .set_default("storage.upload_dir", "data/uploads")?
        .set_default("cache.ttl_secs", 600)?
        .set_default("cache.max_entries", 1000)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: BOOKSTORE_AUTH__TOKEN_EXPIRY_SECS=7200
    builder = builder.add_source(
        Environment::with_prefix("BOOKSTORE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.document_store.backend == DocumentBackend::Mongo
        && config.document_store.uri.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Document store URI is required for the mongo backend".to_string(),
        ));
    }

    if config.auth.jwt_secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ValidationError(format!(
            "JWT secret must be at least {} bytes",
            MIN_SECRET_LEN
        )));
    }

    if config.auth.token_expiry_secs <= 0 {
        return Err(ConfigError::ValidationError(
            "Token expiry must be positive".to_string(),
        ));
    }

    if let Some(admin) = &config.auth.admin {
        if admin.username.trim().is_empty() || admin.password.is_empty() {
            return Err(ConfigError::ValidationError(
                "Admin account requires username and password".to_string(),
            ));
        }
    }

    if config.cache.max_entries == 0 {
        return Err(ConfigError::ValidationError(
            "Cache capacity cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Document Store: {}", config.document_store.backend);
    if config.document_store.backend == DocumentBackend::Mongo {
        tracing::info!("Document Store Database: {}", config.document_store.database);
    }
    tracing::info!("Token Expiry: {}s", config.auth.token_expiry_secs);
    tracing::info!("Upload Directory: {:?}", config.storage.upload_dir);
    tracing::info!(
        "Cache: ttl={}s, max_entries={}",
        config.cache.ttl_secs,
        config.cache.max_entries
    );
    tracing::info!("Log Level: {}", config.log.level);
    if config.auth.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("Using the built-in development JWT secret; set BOOKSTORE_AUTH__JWT_SECRET");
    }
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminAccountConfig;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_default_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_short_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_missing_mongo_uri() {
        let mut config = AppConfig::default();
        config.document_store.uri = String::new();
        assert!(validate_config(&config).is_err());

        config.document_store.backend = DocumentBackend::Memory;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_incomplete_admin() {
        let mut config = AppConfig::default();
        config.auth.admin = Some(AdminAccountConfig {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: String::new(),
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 8088

            [document_store]
            backend = "memory"

            [cache]
            ttl_secs = 5
            "#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.document_store.backend, DocumentBackend::Memory);
        assert_eq!(config.cache.ttl_secs, 5);
        assert_eq!(config.cache.max_entries, 1000);
    }
}
