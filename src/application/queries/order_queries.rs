//! Order Queries

use crate::application::pagination::PageRequest;
use crate::application::ports::OrderFilter;
use crate::domain::identity::UserId;
use crate::domain::ordering::OrderId;

#[derive(Debug, Clone)]
pub struct GetOrder {
    pub id: OrderId,
}

#[derive(Debug, Clone, Default)]
pub struct ListOrders {
    pub filter: OrderFilter,
    pub page: PageRequest,
}

/// 指定用户的订单，用户不存在时返回 NotFound
#[derive(Debug, Clone)]
pub struct ListUserOrders {
    pub user_id: UserId,
    pub page: PageRequest,
}
