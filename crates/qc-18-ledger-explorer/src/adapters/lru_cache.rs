//! # LRU Result Cache
//!
//! Bounded in-process [`ResultCache`]. Least recently used composites are
//! evicted when full; there is no expiry.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value;
use std::num::NonZeroUsize;

use crate::domain::CacheError;
use crate::ports::outbound::ResultCache;

/// In-process LRU store for composite JSON values.
pub struct LruResultCache {
    entries: Mutex<LruCache<String, Value>>,
}

impl LruResultCache {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[async_trait]
impl ResultCache for LruResultCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.lock().contains(key))
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn save(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.entries.lock().put(key.to_string(), value);
        Ok(())
    }
}
