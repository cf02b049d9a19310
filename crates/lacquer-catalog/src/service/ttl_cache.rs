//! Keyed TTL cache shared by the permission and identity layers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

/// How long cached permission and identity entries stay valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
    stored_at: Instant,
    value: V,
}

/// A TTL map from entity id to a cached value.
///
/// Entries expire lazily: an expired entry is dropped by the `get` that
/// finds it. The cache never fetches on its own; callers populate it
/// after a successful upstream call and only then, so upstream failures
/// are never cached.
#[derive(Clone)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<Uuid, CacheEntry<V>>>>,
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the cached value for the key, when present and fresh.
    pub async fn get(&self, key: Uuid) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but has expired; drop it under the write lock.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(&key)
            && entry.stored_at.elapsed() >= self.ttl
        {
            entries.remove(&key);
        }
        None
    }

    /// Stores a value for the key, restarting its TTL.
    pub async fn insert(&self, key: Uuid, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    /// Removes the entry for one key.
    pub async fn invalidate(&self, key: Uuid) {
        let mut entries = self.entries.write().await;
        entries.remove(&key);
    }

    /// Clears the whole cache.
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_elides_the_entries() {
        let cache: TtlCache<Vec<String>> = TtlCache::new(Duration::from_secs(300));
        let rendered = format!("{cache:?}");

        assert!(rendered.starts_with("TtlCache"));
        assert!(rendered.contains("ttl"));
    }

    #[tokio::test]
    async fn fresh_entries_are_returned() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let key = Uuid::new_v4();

        cache.insert(key, vec!["services".to_owned()]).await;
        assert_eq!(cache.get(key).await, Some(vec!["services".to_owned()]));
    }

    #[tokio::test]
    async fn expired_entries_are_dropped() {
        let cache = TtlCache::new(Duration::from_millis(10));
        let key = Uuid::new_v4();

        cache.insert(key, 1u32).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(key).await, None);
        // The expired entry is gone, not just hidden.
        assert_eq!(cache.get(key).await, None);
    }

    #[tokio::test]
    async fn invalidate_removes_only_one_key() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        cache.insert(first, 1u32).await;
        cache.insert(second, 2u32).await;
        cache.invalidate(first).await;

        assert_eq!(cache.get(first).await, None);
        assert_eq!(cache.get(second).await, Some(2));
    }

    #[tokio::test]
    async fn invalidate_all_clears_everything() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        cache.insert(first, 1u32).await;
        cache.insert(second, 2u32).await;
        cache.invalidate_all().await;

        assert_eq!(cache.get(first).await, None);
        assert_eq!(cache.get(second).await, None);
    }

    #[tokio::test]
    async fn reinsert_restarts_the_ttl() {
        let cache = TtlCache::new(Duration::from_millis(50));
        let key = Uuid::new_v4();

        cache.insert(key, 1u32).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.insert(key, 2u32).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get(key).await, Some(2));
    }
}
