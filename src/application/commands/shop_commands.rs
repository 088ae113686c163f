//! Shop Commands

use crate::domain::catalog::BookId;
use crate::domain::customer::{Address, ClientId};
use crate::domain::shop::ShopId;

#[derive(Debug, Clone)]
pub struct CreateShop {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone)]
pub struct UpdateShop {
    pub id: ShopId,
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone)]
pub struct DeleteShop {
    pub id: ShopId,
}

/// 门店关联变更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopMembership {
    Book(BookId),
    Client(ClientId),
}

#[derive(Debug, Clone)]
pub struct AddShopMember {
    pub shop_id: ShopId,
    pub member: ShopMembership,
}

#[derive(Debug, Clone)]
pub struct RemoveShopMember {
    pub shop_id: ShopId,
    pub member: ShopMembership,
}
