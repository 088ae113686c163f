//! Client HTTP Handlers

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

use crate::application::commands::{CreateClient, DeleteClient, UpdateClient, UpdateClientImage};
use crate::application::queries::{GetClient, GetClientByEmail, ListClients};
use crate::application::ClientFilter;
use crate::domain::customer::Client;
use crate::infrastructure::http::auth::AdminUser;
use crate::infrastructure::http::dto::{
    AddressDto, ApiResponse, Empty, ImageParams, ImageUploadForm, PageParams, PageResponse, Paged,
};
use crate::infrastructure::http::error::{ApiError, ErrorResponse};
use crate::infrastructure::http::extract::{AppJson, AppPath, AppQuery};
use crate::infrastructure::http::state::AppState;

use super::storage::read_image_upload;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub address: AddressDto,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            name: c.name,
            surname: c.surname,
            email: c.email,
            phone: c.phone,
            address: c.address.into(),
            image: c.image,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientRequest {
    pub name: String,
    pub surname: String,
    /// 唯一（忽略大小写）
    pub email: String,
    /// 6-20 位数字或空格，可带前导 `+`
    pub phone: String,
    pub address: AddressDto,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientFilterParams {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// 匹配街道、城市、省份、国家或邮编
    pub address: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "clients",
    params(ClientFilterParams, PageParams),
    responses(
        (status = 200, description = "Page of clients", body = ApiResponse<PageResponse<ClientResponse>>),
        (status = 401, body = ErrorResponse),
        (status = 403, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    OriginalUri(uri): OriginalUri,
    AppQuery(filter): AppQuery<ClientFilterParams>,
    AppQuery(page): AppQuery<PageParams>,
) -> Result<Paged<ClientResponse>, ApiError> {
    let query = ListClients {
        filter: ClientFilter {
            name: filter.name,
            surname: filter.surname,
            email: filter.email,
            phone: filter.phone,
            address: filter.address,
        },
        page: page.into_page_request()?,
    };

    let result = state.list_clients_handler.handle(query).await?;

    Ok(Paged::new(&uri, result))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client", body = ApiResponse<ClientResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<ClientResponse>>, ApiError> {
    let client = state.get_client_handler.handle(GetClient { id }).await?;

    Ok(Json(ApiResponse::success(client.into())))
}

/// 按邮箱查找客户（忽略大小写）
#[utoipa::path(
    get,
    path = "/api/clients/email/{email}",
    tag = "clients",
    params(("email" = String, Path, description = "Client email")),
    responses(
        (status = 200, description = "Client", body = ApiResponse<ClientResponse>),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_client_by_email(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(email): AppPath<String>,
) -> Result<Json<ApiResponse<ClientResponse>>, ApiError> {
    let client = state
        .get_client_handler
        .handle_by_email(GetClientByEmail { email })
        .await?;

    Ok(Json(ApiResponse::success(client.into())))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "clients",
    request_body = ClientRequest,
    responses(
        (status = 201, description = "Client created", body = ApiResponse<ClientResponse>),
        (status = 400, body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppJson(req): AppJson<ClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientResponse>>), ApiError> {
    let command = CreateClient {
        name: req.name,
        surname: req.surname,
        email: req.email,
        phone: req.phone,
        address: req.address.into(),
        image: req.image,
    };

    let client = state.create_client_handler.handle(command).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(client.into()))))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = ClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ApiResponse<ClientResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<ClientRequest>,
) -> Result<Json<ApiResponse<ClientResponse>>, ApiError> {
    let command = UpdateClient {
        id,
        name: req.name,
        surname: req.surname,
        email: req.email,
        phone: req.phone,
        address: req.address.into(),
        image: req.image,
    };

    let client = state.update_client_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(client.into())))
}

/// 删除客户，存在订单时返回 409
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client deleted", body = ApiResponse<Empty>),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Client has orders", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.delete_client_handler.handle(DeleteClient { id }).await?;

    Ok(Json(ApiResponse::ok()))
}

/// 上传客户头像
#[utoipa::path(
    patch,
    path = "/api/clients/{id}/image",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client id"), ImageParams),
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image updated", body = ApiResponse<ClientResponse>),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_client_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ImageParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ClientResponse>>, ApiError> {
    let command = UpdateClientImage {
        id,
        upload: read_image_upload(multipart).await?,
        with_url: params.with_url(),
    };

    let client = state.update_client_image_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(client.into())))
}
