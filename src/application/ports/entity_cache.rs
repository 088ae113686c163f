//! Entity Cache Port - 实体读缓存
//!
//! 按 ID 的读穿透缓存：查询命中直接返回，写操作负责失效

use std::sync::Arc;

use crate::domain::catalog::{BookId, BookView, Category, CategoryId, Publisher, PublisherId};
use crate::domain::customer::{Client, ClientId};
use crate::domain::shop::{Shop, ShopId};

pub trait EntityCachePort<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;

    fn put(&self, key: K, value: V);

    /// 当前失效版本号，每次 evict / clear 递增
    fn epoch(&self) -> u64;

    /// 读库前取 `epoch`，读完后用它回填；期间发生过失效则放弃写入
    fn put_if_fresh(&self, key: K, value: V, epoch: u64);

    fn evict(&self, key: &K);

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type BookCache = Arc<dyn EntityCachePort<BookId, BookView>>;
pub type PublisherCache = Arc<dyn EntityCachePort<PublisherId, Publisher>>;
pub type CategoryCache = Arc<dyn EntityCachePort<CategoryId, Category>>;
pub type ClientCache = Arc<dyn EntityCachePort<ClientId, Client>>;
pub type ShopCache = Arc<dyn EntityCachePort<ShopId, Shop>>;
