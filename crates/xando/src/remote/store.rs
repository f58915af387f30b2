//! Remote document store interface.
//!
//! A store holds JSON documents grouped in collections and keyed by id.
//! Clients query, write and subscribe to individual documents. There are no
//! transactions and no version checks: concurrent writes to the same field
//! resolve as last writer wins.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::StoreError;

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, Value>;

/// Identifier of a document within its collection.
pub type DocumentId = String;

/// Equality constraints plus a result cap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    filters: Vec<(String, Value)>,
    limit: Option<usize>,
}

impl Query {
    /// Matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` constraint.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Caps the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Maximum number of results, if capped.
    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Checks a document against every constraint.
    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| document.get(field) == Some(value))
    }
}

/// One notification on a document subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Full contents after a create or update.
    Snapshot(Document),
    /// The document no longer exists.
    Deleted,
    /// The store reported a failure on this subscription.
    Error(StoreError),
}

/// Handle identifying a subscription for [`DocumentStore::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Live feed of changes to one document.
///
/// Changes arrive in the store's commit order for that document. The stream
/// ends when the store drops the subscription; it cannot be restarted.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    changes: mpsc::UnboundedReceiver<Change>,
}

impl Subscription {
    /// Wraps a receiving channel. Store implementations call this.
    pub fn new(id: SubscriptionId, changes: mpsc::UnboundedReceiver<Change>) -> Self {
        Self { id, changes }
    }

    /// This subscription's handle.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next change. Cancel safe.
    pub async fn recv(&mut self) -> Option<Change> {
        self.changes.recv().await
    }
}

impl Stream for Subscription {
    type Item = Change;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.changes.poll_recv(cx)
    }
}

/// Operations a shared document store provides.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Returns matching documents, ordered by id.
    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<(DocumentId, Document)>, StoreError>;

    /// Writes a whole document, replacing any existing one.
    async fn create(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError>;

    /// Merges the given top-level fields into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Document)
    -> Result<(), StoreError>;

    /// Starts watching a document. The current contents, if any, are
    /// delivered first.
    async fn subscribe(&self, collection: &str, id: &str) -> Result<Subscription, StoreError>;

    /// Stops a subscription. Unknown handles are ignored.
    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), StoreError>;

    /// Removes a document. Removing a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
