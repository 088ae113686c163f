//! Auth HTTP Handlers - 注册与登录

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::application::commands::{SignIn, SignUp};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::AppJson;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    /// 至少 5 个字符
    pub password: String,
    /// 必须与 password 一致
    pub password_repeat: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Bearer token
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 注册新用户（USER 角色）
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Invalid data or passwords do not match", body = ErrorResponse),
        (status = 409, description = "Username or email already in use", body = ErrorResponse)
    )
)]
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TokenResponse>>), ApiError> {
    let command = SignUp {
        username: req.username,
        email: req.email,
        name: req.name,
        surname: req.surname,
        password: req.password,
        password_repeat: req.password_repeat,
    };

    let token = state.sign_up_handler.handle(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TokenResponse { token })),
    ))
}

/// 登录并获取 token
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Wrong username or password", body = ErrorResponse)
    )
)]
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignInRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let command = SignIn {
        username: req.username,
        password: req.password,
    };

    let token = state.sign_in_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(TokenResponse { token })))
}
