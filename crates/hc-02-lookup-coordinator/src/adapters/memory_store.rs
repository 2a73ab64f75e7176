//! In-memory handle store
//!
//! Uniqueness is enforced under the write lock, so two racing inserts of the
//! same key produce exactly one `Created`.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::ports::{HandleStore, InsertOutcome};

/// Hash-set backed store
#[derive(Default)]
pub struct InMemoryStore {
    keys: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: RwLock::new(keys.into_iter().map(Into::into).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

#[async_trait]
impl HandleStore for InMemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.keys.read().contains(key))
    }

    async fn insert_unique(&self, key: &str) -> Result<InsertOutcome, StoreError> {
        if self.keys.write().insert(key.to_string()) {
            Ok(InsertOutcome::Created)
        } else {
            Ok(InsertOutcome::AlreadyExists)
        }
    }

    fn stream_all_keys(&self) -> BoxStream<'_, Result<String, StoreError>> {
        // Point-in-time copy; keys inserted afterwards reach the filter via registration.
        let keys: Vec<String> = self.keys.read().iter().cloned().collect();
        stream::iter(keys.into_iter().map(Ok)).boxed()
    }
}
