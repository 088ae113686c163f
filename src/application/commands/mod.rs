//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod auth_commands;
mod book_commands;
mod category_commands;
mod client_commands;
mod order_commands;
mod publisher_commands;
mod shop_commands;
mod user_commands;

pub mod handlers;

pub use auth_commands::*;
pub use book_commands::*;
pub use category_commands::*;
pub use client_commands::*;
pub use order_commands::*;
pub use publisher_commands::*;
pub use shop_commands::*;
pub use user_commands::*;
