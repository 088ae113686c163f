//! Order Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pagination::Page;
use crate::application::ports::{OrderFilter, OrderStorePort, UserRepositoryPort};
use crate::application::queries::{GetOrder, ListOrders, ListUserOrders};
use crate::domain::ordering::Order;

pub struct GetOrderHandler {
    order_store: Arc<dyn OrderStorePort>,
}

impl GetOrderHandler {
    pub fn new(order_store: Arc<dyn OrderStorePort>) -> Self {
        Self { order_store }
    }

    pub async fn handle(&self, query: GetOrder) -> Result<Order, ApplicationError> {
        self.order_store
            .find_by_id(&query.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Order", &query.id))
    }
}

pub struct ListOrdersHandler {
    order_store: Arc<dyn OrderStorePort>,
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl ListOrdersHandler {
    pub fn new(order_store: Arc<dyn OrderStorePort>, user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self {
            order_store,
            user_repo,
        }
    }

    pub async fn handle(&self, query: ListOrders) -> Result<Page<Order>, ApplicationError> {
        Ok(self
            .order_store
            .find_page(&query.filter, &query.page)
            .await?)
    }

    pub async fn handle_for_user(&self, query: ListUserOrders) -> Result<Page<Order>, ApplicationError> {
        self.user_repo
            .find_by_id(query.user_id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| ApplicationError::not_found("User", query.user_id))?;

        let filter = OrderFilter {
            user_id: Some(query.user_id),
        };
        Ok(self.order_store.find_page(&filter, &query.page).await?)
    }
}
