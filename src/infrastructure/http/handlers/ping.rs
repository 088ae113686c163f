//! Ping Handler
//!
//! 健康检查

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::infrastructure::http::dto::ApiResponse;

/// Ping 响应
#[derive(Serialize, ToSchema)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 健康检查
#[utoipa::path(
    get,
    path = "/api/ping",
    tag = "system",
    responses((status = 200, description = "Service is up", body = ApiResponse<PingResponse>))
)]
pub async fn ping() -> Json<ApiResponse<PingResponse>> {
    Json(ApiResponse::success(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
