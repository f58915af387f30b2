//! In-process document store.
//!
//! Every write notifies the document's subscribers while the store lock is
//! held, so subscribers observe one commit order per document. Clones share
//! the same data, which lets several sessions in one process play against
//! each other.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::store::{
    Change, Document, DocumentId, DocumentStore, Query, Subscription, SubscriptionId,
};
use crate::error::StoreError;

#[derive(Debug)]
struct Watcher {
    id: SubscriptionId,
    collection: String,
    document: DocumentId,
    changes: mpsc::UnboundedSender<Change>,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<DocumentId, Document>>,
    watchers: Vec<Watcher>,
    next_subscription: u64,
    failing: bool,
}

impl Inner {
    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing {
            Err(StoreError::new("Store unavailable"))
        } else {
            Ok(())
        }
    }

    fn notify(&mut self, collection: &str, id: &str, change: &Change) {
        self.watchers.retain(|w| {
            if w.collection != collection || w.document != id {
                return true;
            }
            let delivered = w.changes.send(change.clone()).is_ok();
            if !delivered {
                debug!(subscription = w.id.0, "Dropping closed subscription");
            }
            delivered
        });
    }
}

/// Shared in-memory [`DocumentStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory document store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::new("Store lock poisoned"))
    }

    /// Makes every subsequent operation fail until turned off again.
    #[instrument(skip(self))]
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut inner) = self.lock() {
            warn!(failing, "Store availability changed");
            inner.failing = failing;
        }
    }

    /// Pushes an error to every subscriber of a document.
    #[instrument(skip(self))]
    pub fn report_error(&self, collection: &str, id: &str, message: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.notify(collection, id, &Change::Error(StoreError::new(message)));
        }
    }

    /// Reads a document directly.
    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        let inner = self.lock().ok()?;
        inner.collections.get(collection)?.get(id).cloned()
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .ok()
            .and_then(|inner| inner.collections.get(collection).map(BTreeMap::len))
            .unwrap_or(0)
    }

    /// True if the collection holds no documents.
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Number of live subscriptions across all documents.
    pub fn subscriber_count(&self) -> usize {
        self.lock().map(|inner| inner.watchers.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    #[instrument(skip(self))]
    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<(DocumentId, Document)>, StoreError> {
        let inner = self.lock()?;
        inner.check_available()?;
        let matches = inner
            .collections
            .get(collection)
            .into_iter()
            .flat_map(|docs| docs.iter())
            .filter(|(_, doc)| query.matches(doc))
            .take(query.max_results().unwrap_or(usize::MAX))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect::<Vec<_>>();
        debug!(count = matches.len(), "Query complete");
        Ok(matches)
    }

    #[instrument(skip(self, document))]
    async fn create(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_available()?;
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document.clone());
        inner.notify(collection, id, &Change::Snapshot(document));
        debug!("Document created");
        Ok(())
    }

    #[instrument(skip(self, changes), fields(keys = ?changes.keys().collect::<Vec<_>>()))]
    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_available()?;
        let document = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::new(format!("Document {}/{} not found", collection, id)))?;
        document.extend(changes);
        let snapshot = document.clone();
        inner.notify(collection, id, &Change::Snapshot(snapshot));
        debug!("Document updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn subscribe(&self, collection: &str, id: &str) -> Result<Subscription, StoreError> {
        let mut inner = self.lock()?;
        inner.check_available()?;
        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(current) = inner.collections.get(collection).and_then(|docs| docs.get(id)) {
            let _ = tx.send(Change::Snapshot(current.clone()));
        }
        let sub_id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.watchers.push(Watcher {
            id: sub_id,
            collection: collection.to_string(),
            document: id.to_string(),
            changes: tx,
        });
        debug!(subscription = sub_id.0, "Subscribed");
        Ok(Subscription::new(sub_id, rx))
    }

    #[instrument(skip(self))]
    async fn unsubscribe(&self, subscription: SubscriptionId) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.watchers.retain(|w| w.id != subscription);
        debug!("Unsubscribed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.check_available()?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            inner.notify(collection, id, &Change::Deleted);
            debug!("Document deleted");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_query_filters_and_limits() {
        let store = InMemoryStore::new();
        let seeds = [("a", "", "waiting"), ("b", "", "waiting"), ("c", "Zed", "active")];
        for (id, player2, status) in seeds {
            store
                .create("games", id, doc(json!({"player2": player2, "status": status})))
                .await
                .unwrap();
        }

        let open = Query::new().where_eq("player2", "").where_eq("status", "waiting");
        let all = store.query("games", &open).await.unwrap();
        assert_eq!(
            all.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );

        let first = store.query("games", &open.limit(1)).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].0, "a");
    }

    #[tokio::test]
    async fn test_subscription_sees_current_then_changes_in_order() {
        let store = InMemoryStore::new();
        store.create("games", "g", doc(json!({"n": 0}))).await.unwrap();
        let mut sub = store.subscribe("games", "g").await.unwrap();

        store.update("games", "g", doc(json!({"n": 1}))).await.unwrap();
        store.update("games", "g", doc(json!({"m": true}))).await.unwrap();
        store.delete("games", "g").await.unwrap();

        assert_eq!(
            sub.recv().await,
            Some(Change::Snapshot(doc(json!({"n": 0}))))
        );
        assert_eq!(
            sub.recv().await,
            Some(Change::Snapshot(doc(json!({"n": 1}))))
        );
        assert_eq!(
            sub.recv().await,
            Some(Change::Snapshot(doc(json!({"n": 1, "m": true}))))
        );
        assert_eq!(sub.recv().await, Some(Change::Deleted));
    }

    #[tokio::test]
    async fn test_unsubscribe_closes_stream() {
        let store = InMemoryStore::new();
        store.create("games", "g", doc(json!({}))).await.unwrap();
        let mut sub = store.subscribe("games", "g").await.unwrap();
        assert_eq!(store.subscriber_count(), 1);

        store.unsubscribe(sub.id()).await.unwrap();
        assert_eq!(store.subscriber_count(), 0);
        assert!(matches!(sub.recv().await, Some(Change::Snapshot(_))));
        assert_eq!(sub.recv().await, None);
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = InMemoryStore::new();
        let result = store.update("games", "nope", doc(json!({"status": "finished"}))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failing_store_rejects_operations() {
        let store = InMemoryStore::new();
        store.set_failing(true);
        assert!(store.query("games", &Query::new()).await.is_err());
        assert!(store.create("games", "g", Document::new()).await.is_err());
        store.set_failing(false);
        assert!(store.create("games", "g", Document::new()).await.is_ok());
    }
}
