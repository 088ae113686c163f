//! Repository Ports - 关系型存储端口
//!
//! 图书、出版社、分类、客户、门店与用户的持久化抽象。
//! 订单使用文档存储，见 `order_store`。

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::{Page, PageRequest};
use crate::domain::catalog::{Book, BookId, BookView, Category, CategoryId, Publisher, PublisherId};
use crate::domain::customer::{Client, ClientId};
use crate::domain::identity::{User, UserId};
use crate::domain::shop::{Shop, ShopId};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// 外键或库存等约束不满足
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// 非法的查询参数（如未知排序字段）
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// 存储后端不可用
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RepositoryError {
    pub fn unknown_sort(field: &str) -> Self {
        Self::InvalidQuery(format!("Unsupported sort field: {}", field))
    }
}

// ============================================================================
// Book Repository
// ============================================================================

/// 图书查询条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// 出版社名称（包含，忽略大小写）
    pub publisher: Option<String>,
    /// 价格上限（含）
    pub max_price: Option<f64>,
    /// 分类名称（包含，忽略大小写）
    pub category: Option<String>,
    /// 是否包含已下架图书
    pub include_inactive: bool,
}

#[async_trait]
pub trait BookRepositoryPort: Send + Sync {
    /// 插入图书，返回数据库生成的 ID（忽略 `book.id`）
    async fn insert(&self, book: &Book) -> Result<BookId, RepositoryError>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<BookView>, RepositoryError>;

    async fn find_page(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
    ) -> Result<Page<BookView>, RepositoryError>;

    /// 更新可变字段，不存在时返回 `NotFound`
    async fn update(&self, book: &Book) -> Result<(), RepositoryError>;

    /// 原子调整库存，返回调整后的库存
    ///
    /// 调整后库存为负时返回 `ConstraintViolation`，不做修改
    async fn adjust_stock(&self, id: BookId, delta: i32) -> Result<i32, RepositoryError>;

    /// 是否有图书（含已下架）引用该分类
    async fn exists_by_category(&self, category_id: CategoryId) -> Result<bool, RepositoryError>;
}

// ============================================================================
// Publisher Repository
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublisherFilter {
    pub name: Option<String>,
    pub include_inactive: bool,
}

#[async_trait]
pub trait PublisherRepositoryPort: Send + Sync {
    /// 插入出版社，返回数据库生成的 ID
    async fn insert(&self, publisher: &Publisher) -> Result<PublisherId, RepositoryError>;

    async fn find_by_id(&self, id: PublisherId) -> Result<Option<Publisher>, RepositoryError>;

    async fn find_page(
        &self,
        filter: &PublisherFilter,
        page: &PageRequest,
    ) -> Result<Page<Publisher>, RepositoryError>;

    async fn update(&self, publisher: &Publisher) -> Result<(), RepositoryError>;
}

// ============================================================================
// Category Repository
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    pub name: Option<String>,
    pub active: Option<bool>,
}

#[async_trait]
pub trait CategoryRepositoryPort: Send + Sync {
    async fn insert(&self, category: &Category) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    /// 按名称精确查找（忽略大小写）
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError>;

    async fn find_page(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> Result<Page<Category>, RepositoryError>;

    async fn update(&self, category: &Category) -> Result<(), RepositoryError>;

    async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError>;
}

// ============================================================================
// Client Repository
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilter {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// 匹配街道、城市、省份、国家或邮编
    pub address: Option<String>,
}

#[async_trait]
pub trait ClientRepositoryPort: Send + Sync {
    async fn insert(&self, client: &Client) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: ClientId) -> Result<Option<Client>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, RepositoryError>;

    async fn find_page(
        &self,
        filter: &ClientFilter,
        page: &PageRequest,
    ) -> Result<Page<Client>, RepositoryError>;

    async fn update(&self, client: &Client) -> Result<(), RepositoryError>;

    async fn delete(&self, id: ClientId) -> Result<(), RepositoryError>;
}

// ============================================================================
// Shop Repository
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopFilter {
    pub name: Option<String>,
    pub city: Option<String>,
}

#[async_trait]
pub trait ShopRepositoryPort: Send + Sync {
    /// 插入门店及其图书、客户关联
    async fn insert(&self, shop: &Shop) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError>;

    async fn find_page(
        &self,
        filter: &ShopFilter,
        page: &PageRequest,
    ) -> Result<Page<Shop>, RepositoryError>;

    /// 更新名称与地址（关联集合通过 add/remove 维护）
    async fn update(&self, shop: &Shop) -> Result<(), RepositoryError>;

    async fn delete(&self, id: ShopId) -> Result<(), RepositoryError>;

    /// 返回 false 表示关联已存在
    async fn add_book(&self, shop_id: ShopId, book_id: BookId) -> Result<bool, RepositoryError>;

    /// 返回 false 表示关联不存在
    async fn remove_book(&self, shop_id: ShopId, book_id: BookId)
        -> Result<bool, RepositoryError>;

    async fn add_client(
        &self,
        shop_id: ShopId,
        client_id: ClientId,
    ) -> Result<bool, RepositoryError>;

    async fn remove_client(
        &self,
        shop_id: ShopId,
        client_id: ClientId,
    ) -> Result<bool, RepositoryError>;
}

// ============================================================================
// User Repository
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_deleted: Option<bool>,
}

#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// 按用户名查找（忽略大小写）
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_page(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> Result<Page<User>, RepositoryError>;

    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError>;
}
