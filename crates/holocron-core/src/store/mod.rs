//! Document persistence
//!
//! Entities are stored as an opaque JSON payload next to a few indexed
//! scalar fields (parent id, owner id, timestamp). The payload is the source
//! of truth. The indexed fields are derived from the entity by [`Persisted`]
//! on every write, so they never drift from the payload.

mod memory;

pub use memory::MemoryDocumentStore;

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use holocron_model::{CeremonyResponse, CeremonyTemplate, Team, TeamMembership};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// A stored entity with its indexed fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Document id, unique within its collection
    pub id: String,
    /// Owning entity (team for templates, template for responses)
    pub parent_id: Option<String>,
    /// Acting user (creator, respondent, member)
    pub owner_id: Option<String>,
    /// Time used for range queries
    pub timestamp: Option<DateTime<Utc>>,
    /// Serialized entity
    pub payload: String,
}

/// Inclusive time range; absent bounds are unrestricted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Earliest instant included
    pub start: Option<DateTime<Utc>>,
    /// Latest instant included
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Unbounded range
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Range between optional bounds
    #[inline]
    #[must_use]
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Check if no bound is set
    #[inline]
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Check if `at` lies inside the range
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}

/// Filter over indexed fields; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    /// Required parent id
    pub parent_id: Option<String>,
    /// Required owner id
    pub owner_id: Option<String>,
    /// Required timestamp range
    pub range: TimeRange,
}

impl DocumentQuery {
    /// Match everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With parent id
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// With owner id
    #[must_use]
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// With time range
    #[must_use]
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = range;
        self
    }

    /// Check if a document satisfies every set field
    ///
    /// A bounded range excludes documents without a timestamp.
    #[must_use]
    pub fn matches(&self, doc: &StoredDocument) -> bool {
        let parent_ok = self
            .parent_id
            .as_deref()
            .map_or(true, |p| doc.parent_id.as_deref() == Some(p));
        let owner_ok = self
            .owner_id
            .as_deref()
            .map_or(true, |o| doc.owner_id.as_deref() == Some(o));
        let range_ok = self.range.is_unbounded()
            || doc.timestamp.is_some_and(|at| self.range.contains(at));
        parent_ok && owner_ok && range_ok
    }
}

/// Document-style persistence port
///
/// Each upsert is atomic per document. There are no multi-document
/// transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Insert or fully replace a document
    async fn upsert(&self, collection: &str, doc: StoredDocument) -> StoreResult<()>;

    /// Insert a document unless its id is taken
    ///
    /// Returns `false`, leaving the stored document untouched, when the id
    /// already exists. The check and the write are one atomic step.
    async fn insert(&self, collection: &str, doc: StoredDocument) -> StoreResult<bool>;

    /// Document by id
    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Documents matching `query`, in store order
    async fn find(&self, collection: &str, query: &DocumentQuery)
        -> StoreResult<Vec<StoredDocument>>;

    /// Number of documents matching `query`
    async fn count_matching(&self, collection: &str, query: &DocumentQuery) -> StoreResult<usize> {
        Ok(self.find(collection, query).await?.len())
    }
}

/// An entity with a collection and indexed fields
pub trait Persisted: Serialize + DeserializeOwned + Send + Sync {
    /// Collection name
    const COLLECTION: &'static str;

    /// Document id
    fn document_id(&self) -> String;

    /// Parent index
    fn parent_id(&self) -> Option<String> {
        None
    }

    /// Owner index
    fn owner_id(&self) -> Option<String> {
        None
    }

    /// Timestamp index
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl Persisted for CeremonyTemplate {
    const COLLECTION: &'static str = "templates";

    fn document_id(&self) -> String {
        self.id().to_string()
    }

    fn parent_id(&self) -> Option<String> {
        Some(self.team_id().to_string())
    }

    fn owner_id(&self) -> Option<String> {
        self.creator_id().map(ToString::to_string)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at())
    }
}

impl Persisted for CeremonyResponse {
    const COLLECTION: &'static str = "responses";

    fn document_id(&self) -> String {
        self.id.clone()
    }

    fn parent_id(&self) -> Option<String> {
        Some(self.template_id.clone())
    }

    fn owner_id(&self) -> Option<String> {
        Some(self.user_id.to_string())
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.submitted_at)
    }
}

impl Persisted for Team {
    const COLLECTION: &'static str = "teams";

    fn document_id(&self) -> String {
        self.id.clone()
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

impl Persisted for TeamMembership {
    const COLLECTION: &'static str = "memberships";

    // One row per (team, user) pair
    fn document_id(&self) -> String {
        self.pair_key()
    }

    fn parent_id(&self) -> Option<String> {
        Some(self.team_id.clone())
    }

    fn owner_id(&self) -> Option<String> {
        Some(self.user_id.to_string())
    }
}

/// Typed access to one collection
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &std::any::type_name::<T>())
            .field("store", &self.store)
            .finish()
    }
}

impl<T: Persisted> Repository<T> {
    /// Repository over `store`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Encode with freshly derived index fields
    ///
    /// # Errors
    /// [`StoreError::Encode`] when the entity does not serialize
    pub fn to_document(entity: &T) -> StoreResult<StoredDocument> {
        let payload = serde_json::to_string(entity).map_err(|source| StoreError::Encode {
            collection: T::COLLECTION,
            source,
        })?;
        Ok(StoredDocument {
            id: entity.document_id(),
            parent_id: entity.parent_id(),
            owner_id: entity.owner_id(),
            timestamp: entity.timestamp(),
            payload,
        })
    }

    fn decode(doc: &StoredDocument) -> StoreResult<T> {
        serde_json::from_str(&doc.payload).map_err(|source| StoreError::Corrupt {
            collection: T::COLLECTION,
            id: doc.id.clone(),
            source,
        })
    }

    /// Insert or replace
    ///
    /// # Errors
    /// Encoding or backend failure
    pub async fn save(&self, entity: &T) -> StoreResult<()> {
        let doc = Self::to_document(entity)?;
        self.store.upsert(T::COLLECTION, doc).await
    }

    /// Insert a new entity
    ///
    /// Returns `false` without writing when the id is already taken.
    ///
    /// # Errors
    /// Encoding or backend failure
    pub async fn create(&self, entity: &T) -> StoreResult<bool> {
        let doc = Self::to_document(entity)?;
        self.store.insert(T::COLLECTION, doc).await
    }

    /// Entity by id
    ///
    /// # Errors
    /// Backend failure or corrupt payload
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .as_ref()
            .map(Self::decode)
            .transpose()
    }

    /// Entities matching `query`
    ///
    /// # Errors
    /// Backend failure or corrupt payload
    pub async fn find(&self, query: &DocumentQuery) -> StoreResult<Vec<T>> {
        self.store
            .find(T::COLLECTION, query)
            .await?
            .iter()
            .map(Self::decode)
            .collect()
    }

    /// Number of entities matching `query`; payloads are not decoded
    ///
    /// # Errors
    /// Backend failure
    pub async fn count(&self, query: &DocumentQuery) -> StoreResult<usize> {
        self.store.count_matching(T::COLLECTION, query).await
    }

    /// Entities with the given parent
    ///
    /// # Errors
    /// Backend failure or corrupt payload
    pub async fn find_by_parent(&self, parent_id: &str) -> StoreResult<Vec<T>> {
        self.find(&DocumentQuery::new().with_parent(parent_id)).await
    }

    /// Entities with the given owner
    ///
    /// # Errors
    /// Backend failure or corrupt payload
    pub async fn find_by_owner(&self, owner_id: &str) -> StoreResult<Vec<T>> {
        self.find(&DocumentQuery::new().with_owner(owner_id)).await
    }
}
