//! Shop Queries

use crate::application::pagination::PageRequest;
use crate::application::ports::ShopFilter;
use crate::domain::shop::ShopId;

#[derive(Debug, Clone)]
pub struct GetShop {
    pub id: ShopId,
}

#[derive(Debug, Clone, Default)]
pub struct ListShops {
    pub filter: ShopFilter,
    pub page: PageRequest,
}
