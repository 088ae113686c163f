//! Book Queries

use crate::application::pagination::PageRequest;
use crate::application::ports::BookFilter;
use crate::domain::catalog::BookId;

/// 已下架图书视为不存在
#[derive(Debug, Clone)]
pub struct GetBook {
    pub id: BookId,
}

#[derive(Debug, Clone, Default)]
pub struct ListBooks {
    pub filter: BookFilter,
    pub page: PageRequest,
}
