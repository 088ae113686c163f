//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod persistence;

pub use adapters::FileImageStorage;
pub use auth::{ensure_admin_account, Argon2PasswordHasher, JwtTokenService};
pub use events::EventPublisher;
pub use memory::{InMemoryEntityCache, InMemoryOrderStore};
pub use persistence::MongoOrderStore;
