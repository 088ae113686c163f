//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod auth;
mod entity_cache;
mod image_storage;
mod notifier;
mod order_store;
mod repositories;

pub use auth::{AuthError, PasswordHasherPort, TokenClaims, TokenServicePort};
pub use entity_cache::{
    BookCache, CategoryCache, ClientCache, EntityCachePort, PublisherCache, ShopCache,
};
pub use image_storage::{
    image_content_type, image_extension, ImageStorageError, ImageStoragePort, ImageUpload,
    StoredImage, ALLOWED_IMAGE_EXTENSIONS,
};
pub use notifier::{Notification, NotificationEntity, NotificationType, NotifierPort};
pub use order_store::{OrderFilter, OrderReference, OrderStorePort, ORDER_SORT_FIELDS};
pub use repositories::{
    BookFilter, BookRepositoryPort, CategoryFilter, CategoryRepositoryPort, ClientFilter,
    ClientRepositoryPort, PublisherFilter, PublisherRepositoryPort, RepositoryError, ShopFilter,
    ShopRepositoryPort, UserFilter, UserRepositoryPort,
};
