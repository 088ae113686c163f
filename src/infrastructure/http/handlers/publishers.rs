//! Publisher HTTP Handlers

use axum::{
    extract::{Multipart, OriginalUri, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::application::commands::{
    CreatePublisher, DeletePublisher, PatchPublisher, UpdatePublisher, UpdatePublisherImage,
};
use crate::application::queries::{GetPublisher, ListPublishers};
use crate::application::PublisherFilter;
use crate::domain::catalog::{Publisher, PublisherId};
use crate::infrastructure::http::auth::AdminUser;
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, ImageParams, ImageUploadForm, PageParams, PageResponse, Paged,
};
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::{AppJson, AppPath, AppQuery};
use crate::infrastructure::http::state::AppState;

use super::storage::read_image_upload;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct PublisherResponse {
    pub id: PublisherId,
    pub name: String,
    pub image: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Publisher> for PublisherResponse {
    fn from(p: Publisher) -> Self {
        Self {
            id: p.id,
            name: p.name,
            image: p.image,
            active: p.active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublisherRequest {
    pub name: String,
    /// 缺省为占位图
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchPublisherRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PublisherFilterParams {
    /// 名称包含（忽略大小写）
    pub name: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 出版社列表（仅上架）
#[utoipa::path(
    get,
    path = "/api/publishers",
    tag = "publishers",
    params(PublisherFilterParams, PageParams),
    responses(
        (status = 200, description = "Page of publishers", body = ApiResponse<PageResponse<PublisherResponse>>),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn list_publishers(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    AppQuery(filter): AppQuery<PublisherFilterParams>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<PublisherResponse>, ApiError> {
    let query = ListPublishers {
        filter: PublisherFilter {
            name: filter.name,
            include_inactive: false,
        },
        page: page.into_page_request()?,
    };

    let result = state.list_publishers_handler.handle(query).await?;

    Ok(Paged::new(&uri, result))
}

/// 出版社详情
#[utoipa::path(
    get,
    path = "/api/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher id")),
    responses(
        (status = 200, description = "Publisher", body = ApiResponse<PublisherResponse>),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_publisher(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<PublisherId>,
) -> Result<Json<ApiResponse<PublisherResponse>>, ApiError> {
    let publisher = state.get_publisher_handler.handle(GetPublisher { id }).await?;

    Ok(Json(ApiResponse::success(publisher.into())))
}

/// 创建出版社
#[utoipa::path(
    post,
    path = "/api/publishers",
    tag = "publishers",
    request_body = PublisherRequest,
    responses(
        (status = 201, description = "Publisher created", body = ApiResponse<PublisherResponse>),
        (status = 400, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_publisher(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(req): AppJson<PublisherRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PublisherResponse>>), ApiError> {
    let command = CreatePublisher {
        name: req.name,
        image: req.image,
    };

    let publisher = state.create_publisher_handler.handle(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(publisher.into())),
    ))
}

/// 整体更新出版社
#[utoipa::path(
    put,
    path = "/api/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher id")),
    request_body = PublisherRequest,
    responses(
        (status = 200, description = "Publisher updated", body = ApiResponse<PublisherResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_publisher(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<PublisherId>,
    AppJson(req): AppJson<PublisherRequest>,
) -> Result<Json<ApiResponse<PublisherResponse>>, ApiError> {
    let command = UpdatePublisher {
        id,
        name: req.name,
        image: req.image,
    };

    let publisher = state.update_publisher_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(publisher.into())))
}

/// 部分更新出版社
#[utoipa::path(
    patch,
    path = "/api/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher id")),
    request_body = PatchPublisherRequest,
    responses(
        (status = 200, description = "Publisher updated", body = ApiResponse<PublisherResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_publisher(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<PublisherId>,
    AppJson(req): AppJson<PatchPublisherRequest>,
) -> Result<Json<ApiResponse<PublisherResponse>>, ApiError> {
    let command = PatchPublisher {
        id,
        name: req.name,
        image: req.image,
        active: req.active,
    };

    let publisher = state.update_publisher_handler.handle_patch(command).await?;

    Ok(Json(ApiResponse::success(publisher.into())))
}

/// 删除出版社（下架）
#[utoipa::path(
    delete,
    path = "/api/publishers/{id}",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher id")),
    responses(
        (status = 200, description = "Publisher deleted", body = ApiResponse<Empty>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_publisher(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<PublisherId>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_publisher_handler
        .handle(DeletePublisher { id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}

/// 上传出版社图片
#[utoipa::path(
    patch,
    path = "/api/publishers/{id}/image",
    tag = "publishers",
    params(("id" = i64, Path, description = "Publisher id"), ImageParams),
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image updated", body = ApiResponse<PublisherResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_publisher_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<PublisherId>,
    AppQuery(params): AppQuery<ImageParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PublisherResponse>>, ApiError> {
    let command = UpdatePublisherImage {
        id,
        upload: read_image_upload(multipart).await?,
        with_url: params.with_url(),
    };

    let publisher = state.update_publisher_image_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(publisher.into())))
}
