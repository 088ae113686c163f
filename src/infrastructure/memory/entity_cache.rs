//! In-Memory Entity Cache
//!
//! DashMap 实现的 TTL 缓存，超出容量时淘汰最早写入的条目。
//! 失效时递增 epoch，读穿透回填携带读库前的 epoch，避免旧值覆盖失效。

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::ports::EntityCachePort;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    epoch: u64,
}

/// 内存实体缓存
pub struct InMemoryEntityCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    epoch: AtomicU64,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> InMemoryEntityCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            epoch: AtomicU64::new(0),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn insert(&self, key: K, value: V, epoch: u64) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                epoch,
            },
        );
    }

    fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        entry.inserted_at.elapsed() >= self.ttl
    }

    /// 腾出一个位置：先清理过期条目，仍满则淘汰最早写入的条目
    fn make_room(&self) {
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        if self.entries.len() < self.max_entries {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.inserted_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl<K, V> EntityCachePort<K, V> for InMemoryEntityCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if !self.is_expired(&entry) {
                return Some(entry.value.clone());
            }
        }
        self.entries
            .remove_if(key, |_, entry| entry.inserted_at.elapsed() >= self.ttl);
        None
    }

    fn put(&self, key: K, value: V) {
        self.insert(key, value, self.epoch());
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    fn put_if_fresh(&self, key: K, value: V, epoch: u64) {
        if self.epoch() != epoch {
            return;
        }
        self.insert(key.clone(), value, epoch);
        // 插入与失效交错时撤回本次写入
        if self.epoch() != epoch {
            self.entries.remove_if(&key, |_, entry| entry.epoch == epoch);
        }
    }

    fn evict(&self, key: &K) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
