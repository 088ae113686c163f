//! Book HTTP Handlers

use axum::{
    extract::{Multipart, OriginalUri, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::commands::{
    CreateBook, DeleteBook, PatchBook, UpdateBook, UpdateBookImage,
};
use crate::application::queries::{GetBook, ListBooks};
use crate::application::BookFilter;
use crate::domain::catalog::{BookId, BookView, PublisherId};
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

/// 图书，附带出版社与分类名称
#[derive(Debug, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: BookId,
    pub name: String,
    pub author: String,
    pub publisher_id: PublisherId,
    pub publisher_name: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub image: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookView> for BookResponse {
    fn from(view: BookView) -> Self {
        let book = view.book;
        Self {
            id: book.id,
            name: book.name,
            author: book.author,
            publisher_id: book.publisher_id,
            publisher_name: view.publisher_name,
            category_id: book.category_id,
            category_name: view.category_name,
            image: book.image,
            description: book.description,
            price: book.price,
            stock: book.stock,
            active: book.active,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookRequest {
    pub name: String,
    pub author: String,
    pub publisher_id: PublisherId,
    /// 分类名称
    pub category: String,
    pub image: Option<String>,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchBookRequest {
    pub name: Option<String>,
    pub author: Option<String>,
    pub publisher_id: Option<PublisherId>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookFilterParams {
    /// 出版社名称包含
    pub publisher: Option<String>,
    /// 价格上限（含）
    pub max_price: Option<f64>,
    /// 分类名称包含
    pub category: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 图书列表（仅上架）
#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(BookFilterParams, PageParams),
    responses(
        (status = 200, description = "Page of books", body = ApiResponse<PageResponse<BookResponse>>),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    AppQuery(filter): AppQuery<BookFilterParams>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<BookResponse>, ApiError> {
    if filter.max_price.is_some_and(|p| p < 0.0) {
        return Err(ApiError::invalid_field("max_price", "must be greater than or equal to 0"));
    }

    let query = ListBooks {
        filter: BookFilter {
            publisher: filter.publisher,
            max_price: filter.max_price,
            category: filter.category,
            include_inactive: false,
        },
        page: page.into_page_request()?,
    };

    let result = state.list_books_handler.handle(query).await?;

    Ok(Paged::new(&uri, result))
}

/// 图书详情
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book", body = ApiResponse<BookResponse>),
        (status = 404, body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<BookId>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let book = state.get_book_handler.handle(GetBook { id }).await?;

    Ok(Json(ApiResponse::success(book.into())))
}

/// 创建图书
#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book created", body = ApiResponse<BookResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, description = "Publisher or category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(req): AppJson<BookRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookResponse>>), ApiError> {
    let command = CreateBook {
        name: req.name,
        author: req.author,
        publisher_id: req.publisher_id,
        category: req.category,
        image: req.image,
        description: req.description,
        price: req.price,
        stock: req.stock,
    };

    let book = state.create_book_handler.handle(command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(book.into()))))
}

/// 整体更新图书
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    request_body = BookRequest,
    responses(
        (status = 200, description = "Book updated", body = ApiResponse<BookResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<BookId>,
    AppJson(req): AppJson<BookRequest>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let command = UpdateBook {
        id,
        name: req.name,
        author: req.author,
        publisher_id: req.publisher_id,
        category: req.category,
        image: req.image,
        description: req.description,
        price: req.price,
        stock: req.stock,
        active: req.active,
    };

    let book = state.update_book_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(book.into())))
}

/// 部分更新图书
#[utoipa::path(
    patch,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    request_body = PatchBookRequest,
    responses(
        (status = 200, description = "Book updated", body = ApiResponse<BookResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn patch_book(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<BookId>,
    AppJson(req): AppJson<PatchBookRequest>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let command = PatchBook {
        id,
        name: req.name,
        author: req.author,
        publisher_id: req.publisher_id,
        category: req.category,
        image: req.image,
        description: req.description,
        price: req.price,
        stock: req.stock,
        active: req.active,
    };

    let book = state.update_book_handler.handle_patch(command).await?;

    Ok(Json(ApiResponse::success(book.into())))
}

/// 删除图书（下架）
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted", body = ApiResponse<Empty>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<BookId>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.delete_book_handler.handle(DeleteBook { id }).await?;

    Ok(Json(ApiResponse::ok()))
}

/// 上传图书封面
#[utoipa::path(
    patch,
    path = "/api/books/{id}/image",
    tag = "books",
    params(("id" = i64, Path, description = "Book id"), ImageParams),
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image updated", body = ApiResponse<BookResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_book_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<BookId>,
    AppQuery(params): AppQuery<ImageParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let command = UpdateBookImage {
        id,
        upload: read_image_upload(multipart).await?,
        with_url: params.with_url(),
    };

    let book = state.update_book_image_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(book.into())))
}
