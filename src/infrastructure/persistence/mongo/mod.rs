//! MongoDB Persistence - 订单文档存储

mod order_repo;

pub use order_repo::MongoOrderStore;
