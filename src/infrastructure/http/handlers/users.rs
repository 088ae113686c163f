//! User HTTP Handlers

use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::commands::handlers::UserDeletion;
use crate::application::commands::{CreateUser, DeleteUser, PatchUser, UpdateUser};
use crate::application::queries::handlers::UserDetails;
use crate::application::queries::{GetUser, ListUsers};
use crate::application::UserFilter;
use crate::domain::identity::{Role, User};
use crate::domain::ordering::OrderId;
use crate::infrastructure::http::auth::{AdminUser, CurrentUser};
use crate::infrastructure::http::dto::{ApiResponse, Empty, PageParams, PageResponse, Paged};
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::{AppJson, AppPath, AppQuery};
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    #[schema(value_type = Vec<String>, example = json!(["USER"]))]
    pub roles: BTreeSet<Role>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            surname: u.surname,
            username: u.username,
            email: u.email,
            roles: u.roles,
            is_deleted: u.is_deleted,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// 用户详情，附带订单 ID
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetailsResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[schema(value_type = Vec<String>)]
    pub order_ids: Vec<OrderId>,
}

impl From<UserDetails> for UserDetailsResponse {
    fn from(d: UserDetails) -> Self {
        Self {
            user: d.user.into(),
            order_ids: d.order_ids,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    /// 缺省为 ["USER"]
    #[schema(value_type = Option<Vec<String>>)]
    pub roles: Option<BTreeSet<Role>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    /// 为空时保留原密码
    pub password: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub roles: Option<BTreeSet<Role>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub roles: Option<BTreeSet<Role>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_deleted: Option<bool>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 用户列表
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(UserFilterParams, PageParams),
    responses(
        (status = 200, description = "Page of users", body = ApiResponse<PageResponse<UserResponse>>),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    OriginalUri(uri): OriginalUri,
    AppQuery(filter): AppQuery<UserFilterParams>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<UserResponse>, ApiError> {
    let query = ListUsers {
        filter: UserFilter {
            username: filter.username,
            email: filter.email,
            is_deleted: filter.is_deleted,
        },
        page: page.into_page_request()?,
    };

    let result = state.list_users_handler.handle(query).await?;

    Ok(Paged::new(&uri, result))
}

/// 当前登录用户
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Authenticated user", body = ApiResponse<UserDetailsResponse>),
        (status = 401, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<UserDetailsResponse>>, ApiError> {
    let result = state.get_user_handler.handle(GetUser { id: user.id }).await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 用户详情（含订单 ID）
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = ApiResponse<UserDetailsResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<UserDetailsResponse>>, ApiError> {
    let result = state.get_user_handler.handle(GetUser { id }).await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 创建用户
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let command = CreateUser {
        name: req.name,
        surname: req.surname,
        username: req.username,
        email: req.email,
        password: req.password,
        roles: req.roles,
    };

    let user = state.create_user_handler.handle(command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(user.into()))))
}

/// 整体更新用户
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let command = UpdateUser {
        id,
        name: req.name,
        surname: req.surname,
        username: req.username,
        email: req.email,
        password: req.password,
        roles: req.roles,
    };

    let user = state.update_user_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// 部分更新用户
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = PatchUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<PatchUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let command = PatchUser {
        id,
        name: req.name,
        surname: req.surname,
        username: req.username,
        email: req.email,
        password: req.password,
        roles: req.roles,
    };

    let user = state.update_user_handler.handle_patch(command).await?;

    Ok(Json(ApiResponse::success(user.into())))
}

/// 删除用户：有订单时软删除
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<Empty>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let deletion = state.delete_user_handler.handle(DeleteUser { id }).await?;

    tracing::info!(
        user_id = %id,
        deleted_by = %admin.username,
        soft = deletion == UserDeletion::Soft,
        "User removed"
    );

    Ok(Json(ApiResponse::ok()))
}
