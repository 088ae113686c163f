//! User Query Handlers

use serde::Serialize;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pagination::Page;
use crate::application::ports::{OrderStorePort, UserRepositoryPort};
use crate::application::queries::{GetUser, ListUsers};
use crate::domain::identity::User;
use crate::domain::ordering::OrderId;

/// 用户及其订单 ID
#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub order_ids: Vec<OrderId>,
}

pub struct GetUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    order_store: Arc<dyn OrderStorePort>,
}

impl GetUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>, order_store: Arc<dyn OrderStorePort>) -> Self {
        Self {
            user_repo,
            order_store,
        }
    }

    pub async fn handle(&self, query: GetUser) -> Result<UserDetails, ApplicationError> {
        let user = self
            .user_repo
            .find_by_id(query.id)
            .await?
            .filter(|u| !u.is_deleted)
            .ok_or_else(|| ApplicationError::not_found("User", query.id))?;

        let order_ids = self.order_store.ids_by_user(user.id).await?;

        Ok(UserDetails { user, order_ids })
    }
}

pub struct ListUsersHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl ListUsersHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, query: ListUsers) -> Result<Page<User>, ApplicationError> {
        Ok(self.user_repo.find_page(&query.filter, &query.page).await?)
    }
}
