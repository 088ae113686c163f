//! Client Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pagination::Page;
use crate::application::ports::{ClientCache, ClientRepositoryPort};
use crate::application::queries::{GetClient, GetClientByEmail, ListClients};
use crate::domain::customer::Client;

pub struct GetClientHandler {
    repo: Arc<dyn ClientRepositoryPort>,
    cache: ClientCache,
}

impl GetClientHandler {
    pub fn new(repo: Arc<dyn ClientRepositoryPort>, cache: ClientCache) -> Self {
        Self { repo, cache }
    }

    pub async fn handle(&self, query: GetClient) -> Result<Client, ApplicationError> {
        if let Some(client) = self.cache.get(&query.id) {
            return Ok(client);
        }

        let epoch = self.cache.epoch();
        let client = self
            .repo
            .find_by_id(query.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Client", query.id))?;

        self.cache.put_if_fresh(query.id, client.clone(), epoch);
        Ok(client)
    }

    /// 按邮箱查找（不经过缓存）
    pub async fn handle_by_email(&self, query: GetClientByEmail) -> Result<Client, ApplicationError> {
        let email = query.email.trim();
        self.repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Client", email))
    }
}

pub struct ListClientsHandler {
    repo: Arc<dyn ClientRepositoryPort>,
}

impl ListClientsHandler {
    pub fn new(repo: Arc<dyn ClientRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, query: ListClients) -> Result<Page<Client>, ApplicationError> {
        Ok(self.repo.find_page(&query.filter, &query.page).await?)
    }
}
