//! 端到端路由测试：内存 SQLite + 内存订单库 + 临时图片目录

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

use crate::config::AdminAccountConfig;
use crate::infrastructure::auth::{ensure_admin_account, Argon2PasswordHasher, JwtTokenService};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::InMemoryOrderStore;
use crate::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteBookRepository, SqliteCategoryRepository,
    SqliteClientRepository, SqlitePublisherRepository, SqliteShopRepository,
    SqliteUserRepository,
};
use crate::infrastructure::FileImageStorage;

use super::server::build_router;
use super::state::{AppDependencies, AppState, EntityCaches};

const ADMIN_USERNAME: &str = "root";
const ADMIN_PASSWORD: &str = "root-password";

struct TestApp {
    router: Router,
    _upload_dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
        let password_hasher = Arc::new(Argon2PasswordHasher::fast());

        ensure_admin_account(
            user_repo.as_ref(),
            password_hasher.as_ref(),
            &AdminAccountConfig {
                username: ADMIN_USERNAME.to_string(),
                email: "root@bookstore.test".to_string(),
                password: ADMIN_PASSWORD.to_string(),
            },
        )
        .await
        .unwrap();

        let image_storage = FileImageStorage::new(upload_dir.path(), "http://localhost:3000")
            .await
            .unwrap();

        let deps = AppDependencies {
            user_repo,
            publisher_repo: Arc::new(SqlitePublisherRepository::new(pool.clone())),
            category_repo: Arc::new(SqliteCategoryRepository::new(pool.clone())),
            book_repo: Arc::new(SqliteBookRepository::new(pool.clone())),
            client_repo: Arc::new(SqliteClientRepository::new(pool.clone())),
            shop_repo: Arc::new(SqliteShopRepository::new(pool.clone())),
            order_store: InMemoryOrderStore::new().arc(),
            image_storage: Arc::new(image_storage),
            password_hasher,
            token_service: Arc::new(JwtTokenService::new(
                b"router-test-secret-with-enough-bytes!",
                "bookstore-test",
                3600,
            )),
            event_publisher: EventPublisher::new().arc(),
            caches: EntityCaches::in_memory(Duration::from_secs(60), 100),
        };

        let state = Arc::new(AppState::new(deps));
        Self {
            router: build_router(state, 1024 * 1024),
            _upload_dir: upload_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn sign_in(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/signin",
                None,
                Some(json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.sign_in(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    async fn user_token(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@bookstore.test", username),
                    "name": "Ana",
                    "surname": "García",
                    "password": "secret1",
                    "password_repeat": "secret1"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// 出版社 + 分类 + 图书，返回图书 ID
    async fn seed_book(&self, token: &str, price: f64, stock: i32) -> i64 {
        let (_, publisher) = self
            .call(
                Method::POST,
                "/api/publishers",
                Some(token),
                Some(json!({"name": "Planeta"})),
            )
            .await;
        let (_, _) = self
            .call(
                Method::POST,
                "/api/categories",
                Some(token),
                Some(json!({"name": "Novela"})),
            )
            .await;
        let (status, book) = self
            .call(
                Method::POST,
                "/api/books",
                Some(token),
                Some(json!({
                    "name": "El Quijote",
                    "author": "Cervantes",
                    "publisher_id": publisher["data"]["id"],
                    "category": "Novela",
                    "description": "Clásico",
                    "price": price,
                    "stock": stock
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", book);
        book["data"]["id"].as_i64().unwrap()
    }

    async fn seed_client_and_shop(&self, token: &str) -> (String, String) {
        let address = json!({
            "street": "Calle Mayor",
            "number": "1",
            "city": "Madrid",
            "province": "Madrid",
            "country": "España",
            "postal_code": "28013"
        });
        let (status, client) = self
            .call(
                Method::POST,
                "/api/clients",
                Some(token),
                Some(json!({
                    "name": "Luis",
                    "surname": "Pérez",
                    "email": "luis@bookstore.test",
                    "phone": "+34 600 000 000",
                    "address": address
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", client);

        let (status, shop) = self
            .call(
                Method::POST,
                "/api/shops",
                Some(token),
                Some(json!({"name": "Centro", "address": address})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", shop);

        (
            client["data"]["id"].as_str().unwrap().to_string(),
            shop["data"]["id"].as_str().unwrap().to_string(),
        )
    }
}

#[tokio::test]
async fn test_ping_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api/ping", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errno"], 0);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_auth_required_and_admin_only() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errno"], 401);

    let (status, _) = app
        .call(Method::GET, "/api/users", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.user_token("ana").await;
    let (status, body) = app.call(Method::GET, "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errno"], 403);

    // 普通用户可以访问自己的信息与门店
    let (status, body) = app
        .call(Method::GET, "/api/users/me", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ana");
    assert_eq!(body["data"]["roles"], json!(["USER"]));

    let (status, _) = app.call(Method::GET, "/api/shops", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_sign_up_validation() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({
                "username": "bob",
                "email": "bob@bookstore.test",
                "name": "Bob",
                "surname": "Smith",
                "password": "secret1",
                "password_repeat": "secret2"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errno"], 400);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/signin",
            None,
            Some(json!({"username": ADMIN_USERNAME, "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/signin")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errno"], 400);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_book_read_after_write_and_delete() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let book_id = app.seed_book(&token, 19.95, 10).await;

    // 公开读取，附带出版社与分类名称
    let uri = format!("/api/books/{}", book_id);
    let (status, body) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["publisher_name"], "Planeta");
    assert_eq!(body["data"]["category_name"], "Novela");

    let (status, body) = app
        .call(Method::PATCH, &uri, Some(&token), Some(json!({"price": 25.5})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 25.5);

    let (_, body) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(body["data"]["price"], 25.5);

    let (status, body) = app.call(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({}));

    let (status, _) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_list_pagination_and_filters() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.seed_book(&token, 10.0, 1).await;

    let request = Request::builder()
        .uri("/api/books?page=0&size=1&max_price=50")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let link = response
        .headers()
        .get(header::LINK)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(link.contains("rel=\"first\""));
    assert!(link.contains("max_price=50"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["total_elements"], 1);
    assert_eq!(body["data"]["content"][0]["name"], "El Quijote");

    let (status, body) = app
        .call(Method::GET, "/api/books?max_price=5", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_elements"], 0);

    let (status, body) = app
        .call(Method::GET, "/api/books?max_price=-1", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["max_price"].is_array() || body["details"]["max_price"].is_string());

    let (status, _) = app
        .call(Method::GET, "/api/books?sort_by=nope", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_number_out_of_range() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.seed_book(&token, 10.0, 1).await;

    let (status, body) = app
        .call(Method::GET, "/api/books?page=4294967296", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["details"]["page"].is_null());

    // 最大合法页码：空页，没有 next 链接
    let request = Request::builder()
        .uri("/api/books?page=2147483647")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let link = response
        .headers()
        .get(header::LINK)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(!link.contains("rel=\"next\""));
    assert!(link.contains("page=2147483646>; rel=\"prev\""));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["content"], json!([]));
}

#[tokio::test]
async fn test_xml_negotiation() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/api/ping")
        .header(header::ACCEPT, "application/xml")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("<response>"));
    assert!(text.contains("<status>ok</status>"));
}

#[tokio::test]
async fn test_order_lifecycle_adjusts_stock() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let book_id = app.seed_book(&token, 10.0, 5).await;
    let (client_id, shop_id) = app.seed_client_and_shop(&token).await;

    let (_, me) = app.call(Method::GET, "/api/users/me", Some(&token), None).await;
    let user_id = me["data"]["id"].as_str().unwrap().to_string();

    let order = json!({
        "user_id": user_id,
        "client_id": client_id,
        "shop_id": shop_id,
        "order_lines": [{"book_id": book_id, "quantity": 3, "price": 10.0}]
    });
    let (status, body) = app
        .call(Method::POST, "/api/orders", Some(&token), Some(order))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["total"], 30.0);
    assert_eq!(body["data"]["total_books"], 3);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let book_uri = format!("/api/books/{}", book_id);
    let (_, book) = app.call(Method::GET, &book_uri, None, None).await;
    assert_eq!(book["data"]["stock"], 2);

    // 库存不足
    let too_many = json!({
        "user_id": user_id,
        "client_id": client_id,
        "shop_id": shop_id,
        "order_lines": [{"book_id": book_id, "quantity": 3, "price": 10.0}]
    });
    let (status, _) = app
        .call(Method::POST, "/api/orders", Some(&token), Some(too_many))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 价格不一致
    let wrong_price = json!({
        "user_id": user_id,
        "client_id": client_id,
        "shop_id": shop_id,
        "order_lines": [{"book_id": book_id, "quantity": 1, "price": 9.0}]
    });
    let (status, _) = app
        .call(Method::POST, "/api/orders", Some(&token), Some(wrong_price))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/orders/user/{}", user_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_elements"], 1);

    // 有订单的客户不能删除
    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/clients/{}", client_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let order_uri = format!("/api/orders/{}", order_id);
    let (status, _) = app
        .call(Method::DELETE, &order_uri, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, book) = app.call(Method::GET, &book_uri, None, None).await;
    assert_eq!(book["data"]["stock"], 5);

    let (status, _) = app.call(Method::GET, &order_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::GET, "/api/orders/not-an-id", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_order_quantity_rejected() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let book_id = app.seed_book(&token, 10.0, 5).await;
    let (client_id, shop_id) = app.seed_client_and_shop(&token).await;
    let (_, me) = app.call(Method::GET, "/api/users/me", Some(&token), None).await;

    let order = json!({
        "user_id": me["data"]["id"],
        "client_id": client_id,
        "shop_id": shop_id,
        "order_lines": [
            {"book_id": book_id, "quantity": i32::MAX, "price": 10.0},
            {"book_id": book_id, "quantity": 2, "price": 10.0}
        ]
    });
    let (status, body) = app
        .call(Method::POST, "/api/orders", Some(&token), Some(order))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, book) = app
        .call(Method::GET, &format!("/api/books/{}", book_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["data"]["stock"], 5);
}

#[tokio::test]
async fn test_user_with_orders_is_soft_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let book_id = app.seed_book(&admin, 10.0, 5).await;
    let (client_id, shop_id) = app.seed_client_and_shop(&admin).await;

    let ana = app.user_token("ana").await;
    let (_, me) = app.call(Method::GET, "/api/users/me", Some(&ana), None).await;
    let ana_id = me["data"]["id"].as_str().unwrap().to_string();

    let order = json!({
        "user_id": ana_id,
        "client_id": client_id,
        "shop_id": shop_id,
        "order_lines": [{"book_id": book_id, "quantity": 1, "price": 10.0}]
    });
    let (status, body) = app
        .call(Method::POST, "/api/orders", Some(&admin), Some(order))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let ana_uri = format!("/api/users/{}", ana_id);
    let (status, _) = app.call(Method::DELETE, &ana_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call(Method::GET, &ana_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 标记删除后：旧 token 与重新登录都被拒绝
    let (status, _) = app.call(Method::GET, "/api/users/me", Some(&ana), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .call(
            Method::POST,
            "/api/auth/signin",
            None,
            Some(json!({"username": "ana", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 行仍在，订单保留
    let (_, deleted) = app
        .call(Method::GET, "/api/users?is_deleted=true", Some(&admin), None)
        .await;
    assert_eq!(deleted["data"]["total_elements"], 1);
    assert_eq!(deleted["data"]["content"][0]["username"], "ana");
    let (_, orders) = app
        .call(
            Method::GET,
            &format!("/api/orders?user_id={}", ana_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(orders["data"]["total_elements"], 1);
}

#[tokio::test]
async fn test_user_without_orders_is_hard_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let bob = app.user_token("bob").await;
    let (_, me) = app.call(Method::GET, "/api/users/me", Some(&bob), None).await;
    let bob_uri = format!("/api/users/{}", me["data"]["id"].as_str().unwrap());

    let (status, _) = app.call(Method::DELETE, &bob_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, deleted) = app
        .call(Method::GET, "/api/users?is_deleted=true", Some(&admin), None)
        .await;
    assert_eq!(deleted["data"]["total_elements"], 0);
    let (_, found) = app
        .call(Method::GET, "/api/users?username=bob", Some(&admin), None)
        .await;
    assert_eq!(found["data"]["total_elements"], 0);

    let (status, _) = app.call(Method::GET, "/api/users/me", Some(&bob), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.call(Method::DELETE, &bob_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.seed_book(&token, 10.0, 1).await;

    let (_, categories) = app
        .call(Method::GET, "/api/categories?name=Novela", Some(&token), None)
        .await;
    let novela = categories["data"]["content"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::DELETE,
            &format!("/api/categories/{}", novela),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (status, unused) = app
        .call(
            Method::POST,
            "/api/categories",
            Some(&token),
            Some(json!({"name": "Ensayo"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let unused_uri = format!("/api/categories/{}", unused["data"]["id"].as_str().unwrap());
    let (status, _) = app.call(Method::DELETE, &unused_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::GET, &unused_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shop_membership() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let book_id = app.seed_book(&token, 12.0, 3).await;
    let (client_id, shop_id) = app.seed_client_and_shop(&token).await;

    let books_uri = format!("/api/shops/{}/books/{}", shop_id, book_id);
    let (status, body) = app.call(Method::PATCH, &books_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["book_ids"], json!([book_id]));

    let clients_uri = format!("/api/shops/{}/clients/{}", shop_id, client_id);
    let (status, body) = app
        .call(Method::PATCH, &clients_uri, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["client_ids"], json!([client_id]));

    let (status, body) = app
        .call(Method::DELETE, &books_uri, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["book_ids"], json!([]));

    let (status, _) = app
        .call(Method::DELETE, &books_uri, Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/api/shops/{}/books/999999", shop_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_lookup_by_email() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (client_id, _) = app.seed_client_and_shop(&token).await;

    let (status, body) = app
        .call(
            Method::GET,
            "/api/clients/email/LUIS@bookstore.test",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], client_id.as_str());
    assert_eq!(body["data"]["address"]["city"], "Madrid");
}

#[tokio::test]
async fn test_image_upload_and_download() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let (_, publisher) = app
        .call(
            Method::POST,
            "/api/publishers",
            Some(&token),
            Some(json!({"name": "Anaya"})),
        )
        .await;
    let id = publisher["data"]["id"].as_i64().unwrap();

    let boundary = "XBOUNDARY";
    let payload = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/api/publishers/{}/image?with_url=false", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(payload))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let filename = body["data"]["image"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".png"));
    assert!(filename.starts_with(&format!("publisher-{}-", id)));
    assert!(!filename.starts_with("http"));

    let request = Request::builder()
        .uri(format!("/api/storage/{}", filename))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"PNGDATA");

    let (status, _) = app
        .call(Method::GET, "/api/storage/missing.png", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_websocket_requires_token() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(Method::GET, "/ws/notifications", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 已认证但不是升级请求
    let token = app.user_token("eve").await;
    let (status, _) = app
        .call(
            Method::GET,
            &format!("/ws/notifications?token={}", token),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/v3/api-docs", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/books"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}
