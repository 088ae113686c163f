//! Domain Layer - 领域层
//!
//! 限界上下文:
//! - Catalog: 图书、出版社、分类
//! - Customer: 客户与地址
//! - Shop: 门店
//! - Identity: 用户与角色
//! - Ordering: 订单

pub mod catalog;
pub mod customer;
pub mod identity;
pub mod ordering;
pub mod shop;
pub mod validation;

pub use validation::{FieldErrors, ValidationError, DEFAULT_IMAGE};
