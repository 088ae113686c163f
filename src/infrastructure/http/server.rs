//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, LINK};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config;

use super::middleware::{error_logging_middleware, xml_negotiation_middleware};
use super::routes::create_routes;
use super::state::AppState;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        config::ServerConfig::default().into()
    }
}

impl From<&config::ServerConfig> for ServerConfig {
    fn from(c: &config::ServerConfig) -> Self {
        Self {
            host: c.host.clone(),
            port: c.port,
            max_body_size: c.max_body_size,
        }
    }
}

impl From<config::ServerConfig> for ServerConfig {
    fn from(c: config::ServerConfig) -> Self {
        Self::from(&c)
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 构建带全部中间件的 Router
pub fn build_router(state: Arc<AppState>, max_body_size: usize) -> Router {
    // 允许所有来源，暴露分页 Link 头
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
        .expose_headers([LINK])
        .max_age(std::time::Duration::from_secs(3600));

    create_routes()
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(middleware::from_fn(xml_negotiation_middleware))
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state, self.config.max_body_size);
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_app_config() {
        let app = config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
            base_url: None,
            max_body_size: 1024,
        };
        let server = ServerConfig::from(&app);
        assert_eq!(server.addr(), "127.0.0.1:8081");
        assert_eq!(server.max_body_size, 1024);
    }
}
