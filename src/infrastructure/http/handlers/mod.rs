//! HTTP Handlers
//!
//! 每个资源一个模块，处理器只做 DTO 转换并调用应用层 Handler

mod auth;
mod books;
mod categories;
mod clients;
mod orders;
mod ping;
mod publishers;
mod shops;
mod storage;
mod users;
mod websocket;

pub use auth::*;
pub use books::*;
pub use categories::*;
pub use clients::*;
pub use orders::*;
pub use ping::*;
pub use publishers::*;
pub use shops::*;
pub use storage::*;
pub use users::*;
pub use websocket::*;
