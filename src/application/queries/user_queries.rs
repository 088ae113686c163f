//! User Queries

use crate::application::pagination::PageRequest;
use crate::application::ports::UserFilter;
use crate::domain::identity::UserId;

/// 用户详情（含订单 ID），已软删除的用户视为不存在
#[derive(Debug, Clone)]
pub struct GetUser {
    pub id: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct ListUsers {
    pub filter: UserFilter,
    pub page: PageRequest,
}
