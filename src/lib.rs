//! Bookstore API - 图书商城后台服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Catalog: 图书、出版社、分类
//! - Customer: 客户与地址
//! - Shop: 门店
//! - Identity: 用户与角色
//! - Ordering: 订单
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, OrderStore, ImageStorage, EntityCache, Notifier, Auth）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket + OpenAPI
//! - Persistence: SQLite（关系数据）+ MongoDB（订单）
//! - Memory: 实体缓存、内存订单库
//! - Adapters: 本地文件图片存储
//! - Auth: JWT + Argon2
//! - Events: WebSocket 通知广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
