//! Memory Layer - In-Memory State Management
//!
//! 实体读缓存与订单文档库的内存实现

mod entity_cache;
mod order_store;

pub use entity_cache::InMemoryEntityCache;
pub use order_store::InMemoryOrderStore;
