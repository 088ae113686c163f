//! 认证与授权提取器
//!
//! - `CurrentUser`: 任意已登录用户，缺少或无效 token 返回 401
//! - `AdminUser`: 需要 ADMIN 角色，已登录但无权限返回 403
//!
//! 每次请求都重新加载用户，已删除的用户 token 立即失效。

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::application::{ApplicationError, AuthError};
use crate::domain::identity::{Role, User};

use super::error::ApiError;
use super::state::AppState;

/// 从 `Authorization: Bearer <token>` 中取出 token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 校验 token 并加载对应用户
pub async fn authenticate(state: &AppState, token: &str) -> Result<User, ApiError> {
    let claims = state
        .token_service
        .verify(token)
        .map_err(ApplicationError::from)?;
    let user_id = claims.user_id().map_err(ApplicationError::from)?;

    state
        .user_repo
        .find_by_id(user_id)
        .await
        .map_err(ApplicationError::from)?
        .filter(|user| !user.is_deleted)
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))
}

/// 已认证用户
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized(AuthError::MissingToken.to_string()))?;
        authenticate(state, token).await.map(CurrentUser)
    }
}

/// 管理员
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.has_role(Role::Admin) {
            tracing::warn!(user_id = %user.id, username = %user.username, "Admin role required");
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }
        Ok(AdminUser(user))
    }
}
