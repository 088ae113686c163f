//! Book Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::pagination::Page;
use crate::application::ports::{BookCache, BookRepositoryPort};
use crate::application::queries::{GetBook, ListBooks};
use crate::domain::catalog::BookView;

/// GetBook Handler（读穿透缓存）
pub struct GetBookHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
    cache: BookCache,
}

impl GetBookHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>, cache: BookCache) -> Self {
        Self { book_repo, cache }
    }

    pub async fn handle(&self, query: GetBook) -> Result<BookView, ApplicationError> {
        if let Some(view) = self.cache.get(&query.id) {
            tracing::trace!(book_id = query.id, "Book cache hit");
            return Ok(view);
        }

        let epoch = self.cache.epoch();
        let view = self
            .book_repo
            .find_by_id(query.id)
            .await?
            .filter(|v| v.book.active)
            .ok_or_else(|| ApplicationError::not_found("Book", query.id))?;

        self.cache.put_if_fresh(query.id, view.clone(), epoch);
        Ok(view)
    }
}

pub struct ListBooksHandler {
    book_repo: Arc<dyn BookRepositoryPort>,
}

impl ListBooksHandler {
    pub fn new(book_repo: Arc<dyn BookRepositoryPort>) -> Self {
        Self { book_repo }
    }

    pub async fn handle(&self, query: ListBooks) -> Result<Page<BookView>, ApplicationError> {
        Ok(self.book_repo.find_page(&query.filter, &query.page).await?)
    }
}
