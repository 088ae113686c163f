//! SQLite Persistence - SQLite 数据库持久化实现

mod book_repo;
mod category_repo;
mod client_repo;
mod database;
mod publisher_repo;
mod shop_repo;
mod user_repo;

pub use book_repo::*;
pub use category_repo::*;
pub use client_repo::*;
pub use database::*;
pub use publisher_repo::*;
pub use shop_repo::*;
pub use user_repo::*;
