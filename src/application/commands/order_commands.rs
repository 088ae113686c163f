//! Order Commands

use crate::domain::catalog::BookId;
use crate::domain::customer::ClientId;
use crate::domain::identity::UserId;
use crate::domain::ordering::OrderId;
use crate::domain::shop::ShopId;

/// 订单行输入，price 必须等于图书当前价格
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineInput {
    pub book_id: BookId,
    pub quantity: i32,
    pub price: f64,
}

/// 创建订单并预留库存
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: UserId,
    pub client_id: ClientId,
    pub shop_id: ShopId,
    pub order_lines: Vec<OrderLineInput>,
}

/// 替换订单内容，按差额调整库存
#[derive(Debug, Clone)]
pub struct UpdateOrder {
    pub id: OrderId,
    pub client_id: ClientId,
    pub shop_id: ShopId,
    pub order_lines: Vec<OrderLineInput>,
}

/// 删除订单并归还库存
#[derive(Debug, Clone)]
pub struct DeleteOrder {
    pub id: OrderId,
}
