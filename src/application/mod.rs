//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、OrderStore、ImageStorage、Notifier、Auth 等）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - pagination: 分页请求与结果
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod queries;

pub use error::ApplicationError;
pub use pagination::{Page, PageRequest, SortDirection, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub use ports::{
    AuthError, BookFilter, CategoryFilter, ClientFilter, Notification, NotificationEntity,
    NotificationType, NotifierPort, OrderFilter, PublisherFilter, RepositoryError, ShopFilter,
    UserFilter,
};
