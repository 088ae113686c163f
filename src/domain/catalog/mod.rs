//! Catalog Context - 图书目录限界上下文
//!
//! 职责:
//! - 图书（库存、价格、上下架）
//! - 出版社
//! - 分类

mod book;
mod category;
mod publisher;

pub use book::{Book, BookId, BookView};
pub use category::{Category, CategoryId};
pub use publisher::{Publisher, PublisherId};
