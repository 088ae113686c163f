//! Order HTTP Handlers

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

use crate::application::commands::{CreateOrder, DeleteOrder, OrderLineInput, UpdateOrder};
use crate::application::queries::{GetOrder, ListOrders, ListUserOrders};
use crate::application::OrderFilter;
use crate::domain::catalog::BookId;
use crate::domain::ordering::{Order, OrderId, OrderLine};
use crate::infrastructure::http::auth::AdminUser;
use crate::infrastructure::http::dto::{ApiResponse, Empty, PageParams, PageResponse, Paged};
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::{AppJson, AppPath, AppQuery};
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub book_id: BookId,
    pub quantity: i32,
    pub price: f64,
    pub total: f64,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            book_id: line.book_id,
            quantity: line.quantity,
            price: line.price,
            total: line.total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    /// 24 位十六进制
    pub id: String,
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub shop_id: Uuid,
    pub order_lines: Vec<OrderLineResponse>,
    pub total: f64,
    pub total_books: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id.to_string(),
            user_id: o.user_id,
            client_id: o.client_id,
            shop_id: o.shop_id,
            order_lines: o.order_lines.into_iter().map(Into::into).collect(),
            total: o.total,
            total_books: o.total_books,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub book_id: BookId,
    pub quantity: i32,
    /// 必须等于图书当前价格
    pub price: f64,
}

impl From<OrderLineRequest> for OrderLineInput {
    fn from(req: OrderLineRequest) -> Self {
        Self {
            book_id: req.book_id,
            quantity: req.quantity,
            price: req.price,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderCreateRequest {
    pub user_id: Uuid,
    pub client_id: Uuid,
    pub shop_id: Uuid,
    pub order_lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderUpdateRequest {
    pub client_id: Uuid,
    pub shop_id: Uuid,
    pub order_lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderFilterParams {
    pub user_id: Option<Uuid>,
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_field("id", "must be a 24 character hex object id"))
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "orders",
    params(OrderFilterParams, PageParams),
    responses(
        (status = 200, description = "Page of orders", body = ApiResponse<PageResponse<OrderResponse>>),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse),
        (status = 503, description = "Document store unavailable", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    OriginalUri(uri): OriginalUri,
    AppQuery(filter): AppQuery<OrderFilterParams>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<OrderResponse>, ApiError> {
    let query = ListOrders {
        filter: OrderFilter {
            user_id: filter.user_id,
        },
        page: page.into_page_request()?,
    };

    let result = state.list_orders_handler.handle(query).await?;

    Ok(Paged::new(&uri, result))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Order id (ObjectId hex)")),
    responses(
        (status = 200, description = "Order", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<String>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let id = parse_order_id(&id)?;
    let order = state.get_order_handler.handle(GetOrder { id }).await?;

    Ok(Json(ApiResponse::success(order.into())))
}

/// 指定用户的订单
#[utoipa::path(
    get,
    path = "/api/orders/user/{user_id}",
    tag = "orders",
    params(("user_id" = Uuid, Path, description = "User id"), PageParams),
    responses(
        (status = 200, description = "Page of orders", body = ApiResponse<PageResponse<OrderResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    OriginalUri(uri): OriginalUri,
    AppPath(user_id): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<OrderResponse>, ApiError> {
    let query = ListUserOrders {
        user_id,
        page: page.into_page_request()?,
    };

    let result = state.list_orders_handler.handle_for_user(query).await?;

    Ok(Paged::new(&uri, result))
}

/// 创建订单并扣减库存
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "orders",
    request_body = OrderCreateRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid lines or price mismatch", body = ErrorResponse),
        (status = 404, description = "Referenced entity not found", body = ErrorResponse),
        (status = 409, description = "Insufficient stock", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(req): AppJson<OrderCreateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    let command = CreateOrder {
        user_id: req.user_id,
        client_id: req.client_id,
        shop_id: req.shop_id,
        order_lines: req.order_lines.into_iter().map(Into::into).collect(),
    };

    let order = state.create_order_handler.handle(command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(order.into()))))
}

/// 替换订单内容，库存按差额调整
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Order id (ObjectId hex)")),
    request_body = OrderUpdateRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<OrderResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Insufficient stock", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<String>,
    AppJson(req): AppJson<OrderUpdateRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let command = UpdateOrder {
        id: parse_order_id(&id)?,
        client_id: req.client_id,
        shop_id: req.shop_id,
        order_lines: req.order_lines.into_iter().map(Into::into).collect(),
    };

    let order = state.update_order_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(order.into())))
}

/// 删除订单并归还库存
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "orders",
    params(("id" = String, Path, description = "Order id (ObjectId hex)")),
    responses(
        (status = 200, description = "Order deleted", body = ApiResponse<Empty>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    let id = parse_order_id(&id)?;
    state.delete_order_handler.handle(DeleteOrder { id }).await?;

    Ok(Json(ApiResponse::ok()))
}
