//! Bookstore API - 图书商城后台服务
//!
//! - Domain: catalog/, customer/, shop/, identity/, ordering/
//! - Application: commands, queries, ports
//! - Infrastructure: http, persistence, memory, adapters, auth, events

use std::sync::Arc;
use std::time::Duration;

use bookstore::application::ports::OrderStorePort;
use bookstore::config::{load_config, print_config, DocumentBackend, LogConfig};
use bookstore::infrastructure::auth::{ensure_admin_account, Argon2PasswordHasher, JwtTokenService};
use bookstore::infrastructure::events::EventPublisher;
use bookstore::infrastructure::http::{AppDependencies, AppState, EntityCaches, HttpServer, ServerConfig};
use bookstore::infrastructure::memory::InMemoryOrderStore;
use bookstore::infrastructure::persistence::mongo::MongoOrderStore;
use bookstore::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteBookRepository, SqliteCategoryRepository,
    SqliteClientRepository, SqlitePublisherRepository, SqliteShopRepository,
    SqliteUserRepository,
};
use bookstore::infrastructure::FileImageStorage;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},bookstore={},tower_http=debug", log.level, log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Bookstore API v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    // 关系型数据库
    let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
    run_migrations(&pool).await?;

    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let publisher_repo = Arc::new(SqlitePublisherRepository::new(pool.clone()));
    let category_repo = Arc::new(SqliteCategoryRepository::new(pool.clone()));
    let book_repo = Arc::new(SqliteBookRepository::new(pool.clone()));
    let client_repo = Arc::new(SqliteClientRepository::new(pool.clone()));
    let shop_repo = Arc::new(SqliteShopRepository::new(pool.clone()));

    // 订单文档库
    let order_store: Arc<dyn OrderStorePort> = match config.document_store.backend {
        DocumentBackend::Mongo => Arc::new(
            MongoOrderStore::connect(&config.document_store.uri, &config.document_store.database)
                .await?,
        ),
        DocumentBackend::Memory => {
            tracing::warn!("Using in-memory order store, orders are lost on restart");
            InMemoryOrderStore::new().arc()
        }
    };

    // 认证
    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let token_service = Arc::new(JwtTokenService::from_config(&config.auth));

    if let Some(admin) = &config.auth.admin {
        ensure_admin_account(user_repo.as_ref(), password_hasher.as_ref(), admin).await?;
    }

    // 图片存储
    let image_storage = Arc::new(
        FileImageStorage::new(&config.storage.upload_dir, config.server.public_base_url()).await?,
    );

    let deps = AppDependencies {
        user_repo,
        publisher_repo,
        category_repo,
        book_repo,
        client_repo,
        shop_repo,
        order_store,
        image_storage,
        password_hasher,
        token_service,
        event_publisher: EventPublisher::new().arc(),
        caches: EntityCaches::in_memory(
            Duration::from_secs(config.cache.ttl_secs),
            config.cache.max_entries,
        ),
    };

    let state = AppState::new(deps);
    let server = HttpServer::new(ServerConfig::from(&config.server), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
