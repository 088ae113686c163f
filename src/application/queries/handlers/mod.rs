//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod book_handlers;
mod category_handlers;
mod client_handlers;
mod order_handlers;
mod publisher_handlers;
mod shop_handlers;
mod user_handlers;

pub use book_handlers::*;
pub use category_handlers::*;
pub use client_handlers::*;
pub use order_handlers::*;
pub use publisher_handlers::*;
pub use shop_handlers::*;
pub use user_handlers::*;
