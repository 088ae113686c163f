//! Publisher Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pagination::Page;
use crate::application::ports::{PublisherCache, PublisherRepositoryPort};
use crate::application::queries::{GetPublisher, ListPublishers};
use crate::domain::catalog::Publisher;

pub struct GetPublisherHandler {
    repo: Arc<dyn PublisherRepositoryPort>,
    cache: PublisherCache,
}

impl GetPublisherHandler {
    pub fn new(repo: Arc<dyn PublisherRepositoryPort>, cache: PublisherCache) -> Self {
        Self { repo, cache }
    }

    pub async fn handle(&self, query: GetPublisher) -> Result<Publisher, ApplicationError> {
        if let Some(publisher) = self.cache.get(&query.id) {
            return Ok(publisher);
        }

        let epoch = self.cache.epoch();
        let publisher = self
            .repo
            .find_by_id(query.id)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| ApplicationError::not_found("Publisher", query.id))?;

        self.cache.put_if_fresh(query.id, publisher.clone(), epoch);
        Ok(publisher)
    }
}

pub struct ListPublishersHandler {
    repo: Arc<dyn PublisherRepositoryPort>,
}

impl ListPublishersHandler {
    pub fn new(repo: Arc<dyn PublisherRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, query: ListPublishers) -> Result<Page<Publisher>, ApplicationError> {
        Ok(self.repo.find_page(&query.filter, &query.page).await?)
    }
}
