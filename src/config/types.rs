//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 关系型数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 文档数据库配置（订单）
    #[serde(default)]
    pub document_store: DocumentStoreConfig,

    /// 认证配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 图片存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（用于生成图片 URL 与分页 Link）
    /// 如果未设置，则使用 http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,

    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            max_body_size: default_max_body_size(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url
            .clone()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                let host = if self.host == "0.0.0.0" {
                    "localhost"
                } else {
                    &self.host
                };
                format!("http://{}:{}", host, self.port)
            })
    }
}

/// 关系型数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/bookstore.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        if self.path == ":memory:" {
            return "sqlite::memory:".to_string();
        }
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 文档数据库后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentBackend {
    /// MongoDB
    #[default]
    Mongo,
    /// 进程内存储（开发/测试）
    Memory,
}

impl std::fmt::Display for DocumentBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentBackend::Mongo => write!(f, "mongo"),
            DocumentBackend::Memory => write!(f, "memory"),
        }
    }
}

/// 文档数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStoreConfig {
    /// 后端类型
    #[serde(default)]
    pub backend: DocumentBackend,

    /// MongoDB 连接串
    #[serde(default = "default_mongo_uri")]
    pub uri: String,

    /// 数据库名
    #[serde(default = "default_mongo_database")]
    pub database: String,
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_mongo_database() -> String {
    "bookstore".to_string()
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            backend: DocumentBackend::default(),
            uri: default_mongo_uri(),
            database: default_mongo_database(),
        }
    }
}

/// 认证配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 签名密钥
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Token 签发者
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token 有效期（秒）
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    /// 启动时创建的管理员账户
    #[serde(default)]
    pub admin: Option<AdminAccountConfig>,
}

/// 内置开发密钥，生产环境必须覆盖
pub const DEV_JWT_SECRET: &str = "bookstore-development-secret-change-me-please";

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_issuer() -> String {
    "bookstore-api".to_string()
}

fn default_token_expiry() -> i64 {
    3600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            issuer: default_issuer(),
            token_expiry_secs: default_token_expiry(),
            admin: None,
        }
    }
}

/// 管理员账户
#[derive(Debug, Clone, Deserialize)]
pub struct AdminAccountConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// 图片存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 上传目录
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 条目存活时间（秒）
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// 每类实体最大条目数
    #[serde(default = "default_cache_capacity")]
    pub max_entries: usize,
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_cache_capacity() -> usize {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            max_entries: default_cache_capacity(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.path, "data/bookstore.db");
        assert_eq!(config.document_store.backend, DocumentBackend::Mongo);
        assert_eq!(config.auth.token_expiry_secs, 3600);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.public_base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_public_base_url_strips_trailing_slash() {
        let config = ServerConfig {
            base_url: Some("https://books.example.com/".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(config.public_base_url(), "https://books.example.com");
    }

    #[test]
    fn test_database_url() {
        let mut config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/bookstore.db?mode=rwc");

        config.path = ":memory:".to_string();
        assert_eq!(config.database_url(), "sqlite::memory:");
    }
}
