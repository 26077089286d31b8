//! Connection-scoped cache
//!
//! Holds values that are expensive to compute and identical for every query
//! on a connection: resolved partition lists and the API client handle.
//! Entries are write-once. Concurrent first access to the same key runs the
//! initializer exactly once; everyone else waits for and shares its result.

use crate::api::ResourceApi;
use crate::error::Result;
use crate::partition::PartitionList;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// Kind of value stored under a cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheEntry {
    /// Resolved region matrix
    RegionMatrix,
    /// Resolved zone matrix
    ZoneMatrix,
    /// API client handle
    ApiClient,
}

/// Explicit cache key: connection identity plus entry kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Connection the entry belongs to
    pub connection: String,
    /// What is stored
    pub entry: CacheEntry,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(connection: impl Into<String>, entry: CacheEntry) -> Self {
        Self {
            connection: connection.into(),
            entry,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}", self.connection, self.entry)
    }
}

/// Write-once memo table
pub struct Memo<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Memo<K, V> {
    /// Create an empty memo table
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, key: &K) -> Arc<OnceCell<V>> {
        let mut cells = self
            .cells
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(cells.entry(key.clone()).or_default())
    }

    /// Get a stored value
    pub fn get(&self, key: &K) -> Option<V> {
        let cells = self
            .cells
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Get the stored value or compute and store it
    ///
    /// A failing initializer stores nothing, so the next caller retries.
    pub fn get_or_try_init<F>(&self, key: &K, init: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        // The map lock is released before `init` runs; only the per-key cell blocks.
        let cell = self.cell(key);
        cell.get_or_try_init(init).cloned()
    }

    /// Number of initialized entries
    pub fn len(&self) -> usize {
        let cells = self
            .cells
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cells.values().filter(|c| c.get().is_some()).count()
    }

    /// Check if no entry is initialized
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.cells
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}

/// Cache owned by a connection and injected into resolver and client lookup
#[derive(Default)]
pub struct ConnectionCache {
    partitions: Memo<CacheKey, PartitionList>,
    clients: Memo<CacheKey, Arc<dyn ResourceApi>>,
}

impl ConnectionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition list memo
    pub fn partitions(&self) -> &Memo<CacheKey, PartitionList> {
        &self.partitions
    }

    /// API client memo
    pub fn clients(&self) -> &Memo<CacheKey, Arc<dyn ResourceApi>> {
        &self.clients
    }

    /// Invalidate everything (connection teardown or config reload)
    pub fn invalidate(&self) {
        self.partitions.clear();
        self.clients.clear();
    }
}

impl fmt::Debug for ConnectionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("partitions", &self.partitions.len())
            .field("clients", &self.clients.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_memo_stores_once() {
        let memo: Memo<String, u32> = Memo::new();
        let key = "a".to_string();

        let v = memo.get_or_try_init(&key, || Ok(1)).unwrap();
        assert_eq!(v, 1);

        let v = memo.get_or_try_init(&key, || Ok(2)).unwrap();
        assert_eq!(v, 1);
        assert_eq!(memo.get(&key), Some(1));
    }

    #[test]
    fn test_memo_failed_init_is_not_stored() {
        let memo: Memo<String, u32> = Memo::new();
        let key = "a".to_string();

        let err = memo.get_or_try_init(&key, || Err(Error::config("boom")));
        assert!(err.is_err());
        assert!(memo.get(&key).is_none());
        assert!(memo.is_empty());

        assert_eq!(memo.get_or_try_init(&key, || Ok(7)).unwrap(), 7);
    }

    #[test]
    fn test_memo_concurrent_first_access_runs_init_once() {
        let memo: Arc<Memo<String, u32>> = Arc::new(Memo::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    memo.get_or_try_init(&"k".to_string(), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        Ok(42)
                    })
                    .unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_keys_are_per_connection() {
        let cache = ConnectionCache::new();
        let a = CacheKey::new("conn-a", CacheEntry::RegionMatrix);
        let b = CacheKey::new("conn-b", CacheEntry::RegionMatrix);

        let list: PartitionList = vec!["fr-par".to_string()].into();
        cache
            .partitions()
            .get_or_try_init(&a, || Ok(list.clone()))
            .unwrap();

        assert!(cache.partitions().get(&a).is_some());
        assert!(cache.partitions().get(&b).is_none());

        cache.invalidate();
        assert!(cache.partitions().get(&a).is_none());
        assert_eq!(a.to_string(), "conn-a/RegionMatrix");
    }
}
