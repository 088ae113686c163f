//! HTTP Layer - RESTful API + WebSocket
//!
//! - 统一响应信封 `{errno, error, data}`，错误使用真实 HTTP 状态码
//! - Bearer JWT 认证提取器
//! - OpenAPI 文档与 Swagger UI

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::ApiError;
pub use routes::{create_routes, openapi};
pub use server::{build_router, HttpServer, ServerConfig};
pub use state::{AppDependencies, AppState, EntityCaches};
