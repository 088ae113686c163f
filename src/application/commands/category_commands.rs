//! Category Commands

use crate::domain::catalog::CategoryId;

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct UpdateCategory {
    pub id: CategoryId,
    pub name: String,
    pub active: Option<bool>,
}

/// 物理删除，仍被图书引用时冲突
#[derive(Debug, Clone)]
pub struct DeleteCategory {
    pub id: CategoryId,
}
