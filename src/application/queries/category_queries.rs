//! Category Queries

use crate::application::pagination::PageRequest;
use crate::application::ports::CategoryFilter;
use crate::domain::catalog::CategoryId;

#[derive(Debug, Clone)]
pub struct GetCategory {
    pub id: CategoryId,
}

#[derive(Debug, Clone, Default)]
pub struct ListCategories {
    pub filter: CategoryFilter,
    pub page: PageRequest,
}
