//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod book_queries;
mod category_queries;
mod client_queries;
mod order_queries;
mod publisher_queries;
mod shop_queries;
mod user_queries;

pub mod handlers;

pub use book_queries::*;
pub use category_queries::*;
pub use client_queries::*;
pub use order_queries::*;
pub use publisher_queries::*;
pub use shop_queries::*;
pub use user_queries::*;
