//! User Commands

use std::collections::BTreeSet;

use crate::domain::identity::{Role, UserId};

/// 管理员创建用户
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    /// 为空时默认为 USER
    pub roles: Option<BTreeSet<Role>>,
}

/// 整体更新用户；password 为空时保留原密码
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub username: String,
    pub email: String,
    pub password: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
}

/// 部分更新用户
#[derive(Debug, Clone, Default)]
pub struct PatchUser {
    pub id: UserId,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub roles: Option<BTreeSet<Role>>,
}

/// 删除用户：有订单时软删除，否则物理删除
#[derive(Debug, Clone)]
pub struct DeleteUser {
    pub id: UserId,
}
