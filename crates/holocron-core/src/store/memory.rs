//! In-process document store

use super::{DocumentQuery, DocumentStore, StoredDocument};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// [`DocumentStore`] held in a concurrent map
///
/// Query results come back ordered by timestamp, then id.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: DashMap<(String, String), StoredDocument>,
    unavailable: AtomicBool,
}

impl MemoryDocumentStore {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of documents in `collection`
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.docs.iter().filter(|e| e.key().0 == collection).count()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Backend("document store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn upsert(&self, collection: &str, doc: StoredDocument) -> StoreResult<()> {
        self.check_available()?;
        self.docs
            .insert((collection.to_string(), doc.id.clone()), doc);
        Ok(())
    }

    async fn insert(&self, collection: &str, doc: StoredDocument) -> StoreResult<bool> {
        self.check_available()?;
        match self.docs.entry((collection.to_string(), doc.id.clone())) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(doc);
                Ok(true)
            }
        }
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        self.check_available()?;
        Ok(self
            .docs
            .get(&(collection.to_string(), id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn find(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> StoreResult<Vec<StoredDocument>> {
        self.check_available()?;
        let mut found: Vec<StoredDocument> = self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == collection && query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn count_matching(&self, collection: &str, query: &DocumentQuery) -> StoreResult<usize> {
        self.check_available()?;
        Ok(self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == collection && query.matches(entry.value()))
            .count())
    }
}
