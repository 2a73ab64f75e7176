//! In-memory availability cache
//!
//! LRU-bounded; each entry carries its own expiry. Uses `tokio::time::Instant`
//! so expiry follows the runtime clock (pausable in tests).

use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::CacheError;
use crate::ports::AvailabilityCache;

struct Entry {
    taken: bool,
    expires_at: Instant,
}

/// LRU cache with expiry
pub struct InMemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl InMemoryCache {
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Number of entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl AvailabilityCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<bool>, CacheError> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        match entries.get(key).map(|e| (e.taken, e.expires_at > now)) {
            Some((taken, true)) => Ok(Some(taken)),
            Some((_, false)) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, taken: bool, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            taken,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().put(key.to_string(), entry);
        Ok(())
    }
}
