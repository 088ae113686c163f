//! Order Store Port - 文档存储端口
//!
//! 订单以文档形式保存（MongoDB 或进程内实现），契约与关系型仓储一致：
//! 按 ID 增删改查，失败时返回 NotFound / Duplicate。

use async_trait::async_trait;

use super::RepositoryError;
use crate::application::pagination::{Page, PageRequest};
use crate::domain::customer::ClientId;
use crate::domain::identity::UserId;
use crate::domain::ordering::{Order, OrderId};
use crate::domain::shop::ShopId;

/// 订单可排序字段
pub const ORDER_SORT_FIELDS: &[&str] = &["id", "created_at", "updated_at", "total", "total_books"];

/// 订单查询条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub user_id: Option<UserId>,
}

/// 订单引用的外部实体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderReference {
    User(UserId),
    Client(ClientId),
    Shop(ShopId),
}

#[async_trait]
pub trait OrderStorePort: Send + Sync {
    /// 插入订单，ID 已存在时返回 `Duplicate`
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    async fn find_page(
        &self,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, RepositoryError>;

    /// 整体替换订单，不存在时返回 `NotFound`
    async fn replace(&self, order: &Order) -> Result<(), RepositoryError>;

    /// 删除订单，返回是否删除了文档
    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError>;

    /// 是否存在引用该实体的订单
    async fn exists_by(&self, reference: OrderReference) -> Result<bool, RepositoryError>;

    /// 用户的全部订单 ID（按创建时间）
    async fn ids_by_user(&self, user_id: UserId) -> Result<Vec<OrderId>, RepositoryError>;
}
