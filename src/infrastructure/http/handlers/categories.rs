//! Category HTTP Handlers

use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::commands::{CreateCategory, DeleteCategory, UpdateCategory};
use crate::application::queries::{GetCategory, ListCategories};
use crate::application::CategoryFilter;
use crate::domain::catalog::Category;
use crate::infrastructure::http::auth::AdminUser;
use crate::infrastructure::http::dto::{ApiResponse, Empty, PageParams, PageResponse, Paged};
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::{AppJson, AppPath, AppQuery};
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            active: c.active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    /// 唯一（忽略大小写）
    pub name: String,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryFilterParams {
    pub name: Option<String>,
    pub active: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "categories",
    params(CategoryFilterParams, PageParams),
    responses(
        (status = 200, description = "Page of categories", body = ApiResponse<PageResponse<CategoryResponse>>),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    OriginalUri(uri): OriginalUri,
    AppQuery(filter): AppQuery<CategoryFilterParams>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<CategoryResponse>, ApiError> {
    let query = ListCategories {
        filter: CategoryFilter {
            name: filter.name,
            active: filter.active,
        },
        page: page.into_page_request()?,
    };

    let result = state.list_categories_handler.handle(query).await?;

    Ok(Paged::new(&uri, result))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<CategoryResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiError> {
    let category = state.get_category_handler.handle(GetCategory { id }).await?;

    Ok(Json(ApiResponse::success(category.into())))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 400, body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(req): AppJson<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), ApiError> {
    let command = CreateCategory {
        name: req.name,
        active: req.active,
    };

    let category = state.create_category_handler.handle(command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(category.into()))))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<CategoryRequest>,
) -> Result<Json<ApiResponse<CategoryResponse>>, ApiError> {
    let command = UpdateCategory {
        id,
        name: req.name,
        active: req.active,
    };

    let category = state.update_category_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(category.into())))
}

/// 删除分类，仍有图书引用时返回 409
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<Empty>),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Category has books", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_category_handler
        .handle(DeleteCategory { id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
