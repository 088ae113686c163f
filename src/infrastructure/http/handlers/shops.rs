//! Shop HTTP Handlers

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

use crate::application::commands::{
    AddShopMember, CreateShop, DeleteShop, RemoveShopMember, ShopMembership, UpdateShop,
};
use crate::application::queries::{GetShop, ListShops};
use crate::application::ShopFilter;
use crate::domain::catalog::BookId;
use crate::domain::shop::{Shop, ShopId};
use crate::infrastructure::http::auth::{AdminUser, CurrentUser};
use crate::infrastructure::http::dto::{AddressDto, ApiResponse, Empty, PageParams, PageResponse, Paged};
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::{AppJson, AppPath, AppQuery};
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ShopResponse {
    pub id: Uuid,
    pub name: String,
    pub address: AddressDto,
    pub book_ids: Vec<BookId>,
    pub client_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Shop> for ShopResponse {
    fn from(s: Shop) -> Self {
        Self {
            id: s.id,
            name: s.name,
            address: s.address.into(),
            book_ids: s.book_ids.into_iter().collect(),
            client_ids: s.client_ids.into_iter().collect(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShopRequest {
    pub name: String,
    pub address: AddressDto,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShopFilterParams {
    pub name: Option<String>,
    pub city: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 门店列表（任意登录用户）
#[utoipa::path(
    get,
    path = "/api/shops",
    tag = "shops",
    params(ShopFilterParams, PageParams),
    responses(
        (status = 200, description = "Page of shops", body = ApiResponse<PageResponse<ShopResponse>>),
        (status = 401, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_shops(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    OriginalUri(uri): OriginalUri,
    AppQuery(filter): AppQuery<ShopFilterParams>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<ShopResponse>, ApiError> {
    let query = ListShops {
        filter: ShopFilter {
            name: filter.name,
            city: filter.city,
        },
        page: page.into_page_request()?,
    };

    let result = state.list_shops_handler.handle(query).await?;

    Ok(Paged::new(&uri, result))
}

#[utoipa::path(
    get,
    path = "/api/shops/{id}",
    tag = "shops",
    params(("id" = Uuid, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Shop", body = ApiResponse<ShopResponse>),
        (status = 401, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_shop(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    AppPath(id): AppPath<ShopId>,
) -> Result<Json<ApiResponse<ShopResponse>>, ApiError> {
    let shop = state.get_shop_handler.handle(GetShop { id }).await?;

    Ok(Json(ApiResponse::success(shop.into())))
}

#[utoipa::path(
    post,
    path = "/api/shops",
    tag = "shops",
    request_body = ShopRequest,
    responses(
        (status = 201, description = "Shop created", body = ApiResponse<ShopResponse>),
        (status = 400, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_shop(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(req): AppJson<ShopRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShopResponse>>), ApiError> {
    let command = CreateShop {
        name: req.name,
        address: req.address.into(),
    };

    let shop = state.create_shop_handler.handle(command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(shop.into()))))
}

#[utoipa::path(
    put,
    path = "/api/shops/{id}",
    tag = "shops",
    params(("id" = Uuid, Path, description = "Shop id")),
    request_body = ShopRequest,
    responses(
        (status = 200, description = "Shop updated", body = ApiResponse<ShopResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_shop(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<ShopId>,
    AppJson(req): AppJson<ShopRequest>,
) -> Result<Json<ApiResponse<ShopResponse>>, ApiError> {
    let command = UpdateShop {
        id,
        name: req.name,
        address: req.address.into(),
    };

    let shop = state.update_shop_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(shop.into())))
}

/// 删除门店，存在订单时返回 409
#[utoipa::path(
    delete,
    path = "/api/shops/{id}",
    tag = "shops",
    params(("id" = Uuid, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Shop deleted", body = ApiResponse<Empty>),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Shop has orders", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_shop(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<ShopId>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.delete_shop_handler.handle(DeleteShop { id }).await?;

    Ok(Json(ApiResponse::ok()))
}

// ============================================================================
// 门店图书 / 客户
// ============================================================================

/// 门店上架图书
#[utoipa::path(
    patch,
    path = "/api/shops/{id}/books/{book_id}",
    tag = "shops",
    params(
        ("id" = Uuid, Path, description = "Shop id"),
        ("book_id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book added", body = ApiResponse<ShopResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_shop_book(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath((id, book_id)): AppPath<(ShopId, BookId)>,
) -> Result<Json<ApiResponse<ShopResponse>>, ApiError> {
    let command = AddShopMember {
        shop_id: id,
        member: ShopMembership::Book(book_id),
    };

    let shop = state.add_shop_member_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(shop.into())))
}

/// 门店下架图书
#[utoipa::path(
    delete,
    path = "/api/shops/{id}/books/{book_id}",
    tag = "shops",
    params(
        ("id" = Uuid, Path, description = "Shop id"),
        ("book_id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book removed", body = ApiResponse<ShopResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_shop_book(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath((id, book_id)): AppPath<(ShopId, BookId)>,
) -> Result<Json<ApiResponse<ShopResponse>>, ApiError> {
    let command = RemoveShopMember {
        shop_id: id,
        member: ShopMembership::Book(book_id),
    };

    let shop = state.remove_shop_member_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(shop.into())))
}

/// 门店添加客户
#[utoipa::path(
    patch,
    path = "/api/shops/{id}/clients/{client_id}",
    tag = "shops",
    params(
        ("id" = Uuid, Path, description = "Shop id"),
        ("client_id" = Uuid, Path, description = "Client id")
    ),
    responses(
        (status = 200, description = "Client added", body = ApiResponse<ShopResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_shop_client(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath((id, client_id)): AppPath<(ShopId, Uuid)>,
) -> Result<Json<ApiResponse<ShopResponse>>, ApiError> {
    let command = AddShopMember {
        shop_id: id,
        member: ShopMembership::Client(client_id),
    };

    let shop = state.add_shop_member_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(shop.into())))
}

/// 门店移除客户
#[utoipa::path(
    delete,
    path = "/api/shops/{id}/clients/{client_id}",
    tag = "shops",
    params(
        ("id" = Uuid, Path, description = "Shop id"),
        ("client_id" = Uuid, Path, description = "Client id")
    ),
    responses(
        (status = 200, description = "Client removed", body = ApiResponse<ShopResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_shop_client(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath((id, client_id)): AppPath<(ShopId, Uuid)>,
) -> Result<Json<ApiResponse<ShopResponse>>, ApiError> {
    let command = RemoveShopMember {
        shop_id: id,
        member: ShopMembership::Client(client_id),
    };

    let shop = state.remove_shop_member_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(shop.into())))
}
