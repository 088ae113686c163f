//! Shop Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pagination::Page;
use crate::application::ports::{ShopCache, ShopRepositoryPort};
use crate::application::queries::{GetShop, ListShops};
use crate::domain::shop::Shop;

pub struct GetShopHandler {
    repo: Arc<dyn ShopRepositoryPort>,
    cache: ShopCache,
}

impl GetShopHandler {
    pub fn new(repo: Arc<dyn ShopRepositoryPort>, cache: ShopCache) -> Self {
        Self { repo, cache }
    }

    pub async fn handle(&self, query: GetShop) -> Result<Shop, ApplicationError> {
        if let Some(shop) = self.cache.get(&query.id) {
            return Ok(shop);
        }

        let epoch = self.cache.epoch();
        let shop = self
            .repo
            .find_by_id(query.id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Shop", query.id))?;

        self.cache.put_if_fresh(query.id, shop.clone(), epoch);
        Ok(shop)
    }
}

pub struct ListShopsHandler {
    repo: Arc<dyn ShopRepositoryPort>,
}

impl ListShopsHandler {
    pub fn new(repo: Arc<dyn ShopRepositoryPort>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, query: ListShops) -> Result<Page<Shop>, ApplicationError> {
        Ok(self.repo.find_page(&query.filter, &query.page).await?)
    }
}
