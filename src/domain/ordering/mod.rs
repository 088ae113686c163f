//! Ordering Context - 订单限界上下文
//!
//! 订单保存在文档库中，通过 id 引用用户、客户、门店与图书

mod aggregate;
mod value_objects;

pub use aggregate::{quantities_of, Order};
pub use value_objects::{OrderId, OrderIdError, OrderLine};
