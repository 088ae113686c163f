//! In-Memory Order Store
//!
//! 文档库的进程内实现，用于开发环境与测试

use async_trait::async_trait;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::application::pagination::{Page, PageRequest, SortDirection};
use crate::application::ports::{
    OrderFilter, OrderReference, OrderStorePort, RepositoryError, ORDER_SORT_FIELDS,
};
use crate::domain::identity::UserId;
use crate::domain::ordering::{Order, OrderId};

/// 内存订单存储
pub struct InMemoryOrderStore {
    orders: DashMap<OrderId, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn matching(&self, filter: &OrderFilter) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| filter.user_id.map_or(true, |id| entry.user_id == id))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn compare(a: &Order, b: &Order, field: &str) -> Ordering {
    match field {
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        "total" => a.total.partial_cmp(&b.total).unwrap_or(Ordering::Equal),
        "total_books" => a.total_books.cmp(&b.total_books),
        _ => a.id.cmp(&b.id),
    }
}

#[async_trait]
impl OrderStorePort for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        match self.orders.entry(order.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(RepositoryError::Duplicate(format!("Order {}", order.id)))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(order.clone());
                tracing::debug!(order_id = %order.id, "Order stored in memory");
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.get(id).map(|o| o.clone()))
    }

    async fn find_page(
        &self,
        filter: &OrderFilter,
        page: &PageRequest,
    ) -> Result<Page<Order>, RepositoryError> {
        let field = page
            .sort_field(ORDER_SORT_FIELDS)
            .ok_or_else(|| RepositoryError::unknown_sort(&page.sort_by))?;

        let mut orders = self.matching(filter);
        orders.sort_by(|a, b| {
            let ordering = compare(a, b, field);
            match page.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = orders.len() as u64;
        let content = orders
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(Page::new(content, total, page))
    }

    async fn replace(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut stored = self
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Order {}", order.id)))?;
        *stored = order.clone();
        Ok(())
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError> {
        Ok(self.orders.remove(id).is_some())
    }

    async fn exists_by(&self, reference: OrderReference) -> Result<bool, RepositoryError> {
        Ok(self.orders.iter().any(|entry| match reference {
            OrderReference::User(id) => entry.user_id == id,
            OrderReference::Client(id) => entry.client_id == id,
            OrderReference::Shop(id) => entry.shop_id == id,
        }))
    }

    async fn ids_by_user(&self, user_id: UserId) -> Result<Vec<OrderId>, RepositoryError> {
        let mut orders = self.matching(&OrderFilter {
            user_id: Some(user_id),
        });
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(orders.into_iter().map(|o| o.id).collect())
    }
}
