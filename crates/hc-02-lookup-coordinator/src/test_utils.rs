//! Counting and failure-injecting collaborators for tests
//!
//! Available to this crate's unit tests and, with the `test-utils` feature,
//! to downstream test suites.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;

use crate::adapters::{InMemoryCache, InMemoryStore};
use crate::domain::CoordinatorEvent;
use crate::error::{CacheError, StoreError};
use crate::ports::{AvailabilityCache, EventSink, HandleStore, InsertOutcome};

/// Wraps `InMemoryStore`, counting calls and optionally failing them
pub struct CountingStore {
    inner: InMemoryStore,
    pub exists_calls: AtomicU64,
    pub insert_calls: AtomicU64,
    pub stream_calls: AtomicU64,
    pub fail_exists: AtomicBool,
    pub fail_insert: AtomicBool,
    /// Fail the key stream after this many keys (`usize::MAX` = never)
    pub fail_stream_after: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::from_store(InMemoryStore::new())
    }

    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_store(InMemoryStore::with_keys(keys))
    }

    fn from_store(inner: InMemoryStore) -> Self {
        Self {
            inner,
            exists_calls: AtomicU64::new(0),
            insert_calls: AtomicU64::new(0),
            stream_calls: AtomicU64::new(0),
            fail_exists: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            fail_stream_after: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn exists_calls(&self) -> u64 {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> u64 {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_stream_after(&self, keys: usize) {
        self.fail_stream_after.store(keys, Ordering::SeqCst);
    }

    /// Underlying store, bypassing counters and failure flags
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }
}

impl Default for CountingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HandleStore for CountingStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionError("injected".into()));
        }
        self.inner.exists(key).await
    }

    async fn insert_unique(&self, key: &str) -> Result<InsertOutcome, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout);
        }
        self.inner.insert_unique(key).await
    }

    fn stream_all_keys(&self) -> BoxStream<'_, Result<String, StoreError>> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        let fail_after = self.fail_stream_after.load(Ordering::SeqCst);
        let keys = self.inner.stream_all_keys();
        if fail_after == usize::MAX {
            return keys;
        }
        keys.take(fail_after)
            .chain(stream::once(async {
                Err(StoreError::QueryError("injected stream failure".into()))
            }))
            .boxed()
    }
}

/// Wraps `InMemoryCache`, counting calls and optionally failing them
pub struct CountingCache {
    inner: InMemoryCache,
    pub get_calls: AtomicU64,
    pub set_calls: AtomicU64,
    pub fail: AtomicBool,
}

impl CountingCache {
    pub fn new() -> Self {
        Self {
            inner: InMemoryCache::new(10_000),
            get_calls: AtomicU64::new(0),
            set_calls: AtomicU64::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> u64 {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Underlying cache, bypassing counters and failure flag
    pub fn inner(&self) -> &InMemoryCache {
        &self.inner
    }
}

impl Default for CountingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvailabilityCache for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<bool>, CacheError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, taken: bool, ttl: Duration) -> Result<(), CacheError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(CacheError::Timeout);
        }
        self.inner.set(key, taken, ttl).await
    }
}

/// Collects every emitted event
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<CoordinatorEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CoordinatorEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&CoordinatorEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&self, event: &CoordinatorEvent) {
        self.events.lock().push(event.clone());
    }
}
