//! Category Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pagination::Page;
use crate::application::ports::{CategoryCache, CategoryRepositoryPort};
use crate::application::queries::{GetCategory, ListCategories};
use crate::domain::catalog::Category;

pub struct GetCategoryHandler {
    repo: Arc<dyn CategoryRepositoryPort>,
    cache: CategoryCache,
}

impl GetCategoryHandler {
    pub fn new(repo: Arc<dyn CategoryRepositoryPort>, cache: CategoryCache) -> Self {
        Self { repo, cache }
    }

    pub async fn handle(&self, query: GetCategory) -> Result<Category, ApplicationError> {
        if let Some(category) = self.cache.get(&query.id) {
            return Ok(category);
        }

        let epoch = self.cache.epoch();
        let category = self
            .repo
            .find_by_id(query.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Category", query.id))?;

        self.cache.put_if_fresh(query.id, category.clone(), epoch);
        Ok(category)
    }
}

pub struct ListCategoriesHandler {
    repo: Arc<dyn CategoryRepositoryPort>,
}

impl ListCategoriesHandler {
    pub fn new(repo: Arc<dyn CategoryRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, query: ListCategories) -> Result<Page<Category>, ApplicationError> {
        Ok(self.repo.find_page(&query.filter, &query.page).await?)
    }
}
