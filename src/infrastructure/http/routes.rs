//! HTTP Routes
//!
//! API 路由定义，同时生成 OpenAPI 文档
//!
//! API Endpoints:
//! - /api/ping                                  GET
//! - /api/auth/signup | signin                  POST
//! - /api/users[/{id}] /api/users/me            用户管理（管理员），me 为任意用户
//! - /api/publishers[/{id}[/image]]             GET 公开，其余管理员
//! - /api/categories[/{id}]                     管理员
//! - /api/books[/{id}[/image]]                  GET 公开，其余管理员
//! - /api/clients[/{id}[/image]] /email/{email} 管理员
//! - /api/shops[/{id}] + books/clients 成员     GET 任意用户，其余管理员
//! - /api/orders[/{id}] /api/orders/user/{id}   管理员
//! - /api/storage/{filename}                    GET 公开
//! - /ws/notifications                          WS 实体变更通知
//! - /swagger-ui, /v3/api-docs                  文档

use axum::{routing::get, Router};
use std::sync::Arc;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::*;
use super::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookstore API",
        description = "图书商城后台：目录、客户、门店、订单与实时通知"
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "system", description = "健康检查"),
        (name = "auth", description = "注册与登录"),
        (name = "users", description = "用户管理"),
        (name = "publishers", description = "出版社"),
        (name = "categories", description = "图书分类"),
        (name = "books", description = "图书"),
        (name = "clients", description = "客户"),
        (name = "shops", description = "门店"),
        (name = "orders", description = "订单"),
        (name = "storage", description = "图片下载")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    let (router, api) = api_routes().split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/v3/api-docs", api))
        .route("/ws/notifications", get(notifications_ws_handler))
}

/// 生成 OpenAPI 文档
pub fn openapi() -> utoipa::openapi::OpenApi {
    api_routes().split_for_parts().1
}

/// API 路由（同一路径的处理器放在同一个 routes! 中）
fn api_routes() -> OpenApiRouter<Arc<AppState>> {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(ping))
        // auth
        .routes(routes!(sign_up))
        .routes(routes!(sign_in))
        // users
        .routes(routes!(list_users, create_user))
        .routes(routes!(get_me))
        .routes(routes!(get_user, update_user, patch_user, delete_user))
        // publishers
        .routes(routes!(list_publishers, create_publisher))
        .routes(routes!(get_publisher, update_publisher, patch_publisher, delete_publisher))
        .routes(routes!(update_publisher_image))
        // categories
        .routes(routes!(list_categories, create_category))
        .routes(routes!(get_category, update_category, delete_category))
        // books
        .routes(routes!(list_books, create_book))
        .routes(routes!(get_book, update_book, patch_book, delete_book))
        .routes(routes!(update_book_image))
        // clients
        .routes(routes!(list_clients, create_client))
        .routes(routes!(get_client, update_client, delete_client))
        .routes(routes!(get_client_by_email))
        .routes(routes!(update_client_image))
        // shops
        .routes(routes!(list_shops, create_shop))
        .routes(routes!(get_shop, update_shop, delete_shop))
        .routes(routes!(add_shop_book, remove_shop_book))
        .routes(routes!(add_shop_client, remove_shop_client))
        // orders
        .routes(routes!(list_orders, create_order))
        .routes(routes!(get_order, update_order, delete_order))
        .routes(routes!(list_user_orders))
        // storage
        .routes(routes!(download_image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_openapi_documents_all_routes() {
        let api = openapi();
        let paths: BTreeSet<&str> = api.paths.paths.keys().map(String::as_str).collect();

        let expected: BTreeSet<&str> = [
            "/api/ping",
            "/api/auth/signup",
            "/api/auth/signin",
            "/api/users",
            "/api/users/me",
            "/api/users/{id}",
            "/api/publishers",
            "/api/publishers/{id}",
            "/api/publishers/{id}/image",
            "/api/categories",
            "/api/categories/{id}",
            "/api/books",
            "/api/books/{id}",
            "/api/books/{id}/image",
            "/api/clients",
            "/api/clients/{id}",
            "/api/clients/email/{email}",
            "/api/clients/{id}/image",
            "/api/shops",
            "/api/shops/{id}",
            "/api/shops/{id}/books/{book_id}",
            "/api/shops/{id}/clients/{client_id}",
            "/api/orders",
            "/api/orders/{id}",
            "/api/orders/user/{user_id}",
            "/api/storage/{filename}",
        ]
        .into_iter()
        .collect();

        assert_eq!(paths, expected);
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let api = openapi();
        let components = api.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
