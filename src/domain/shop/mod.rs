//! Shop Context - 门店限界上下文
//!
//! 门店持有在售图书与登记客户的引用集合

mod aggregate;

pub use aggregate::{Shop, ShopId};
