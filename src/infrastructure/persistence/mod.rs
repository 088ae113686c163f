//! Persistence Layer - 数据持久化
//!
//! SQLite（关系数据）和 MongoDB（订单文档）存储实现

pub mod mongo;
pub mod sqlite;

pub use self::mongo::MongoOrderStore;
