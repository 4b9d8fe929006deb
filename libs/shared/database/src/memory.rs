use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{Collection, Document, Fields, StoreError};

use crate::gateway::{Predicate, Query, StoreGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Get,
    Query,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
struct FailureRule {
    op: StoreOp,
    collection: Collection,
    skip: usize,
}

/// Process-local document store.
///
/// Backs the `memory` store backend and stands in for the remote store in
/// tests. Failures can be scheduled per operation and collection with
/// [`InMemoryStore::fail_next`] or [`InMemoryStore::fail_after`]; each
/// scheduled failure fires once.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Fields>>>,
    failures: Mutex<Vec<FailureRule>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `op` against `collection` fail with `StoreError::Unavailable`.
    pub fn fail_next(&self, op: StoreOp, collection: Collection) {
        self.fail_after(op, collection, 0);
    }

    /// Lets `successes` matching calls through, then fails the one after.
    pub fn fail_after(&self, op: StoreOp, collection: Collection, successes: usize) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(FailureRule {
                op,
                collection,
                skip: successes,
            });
        }
    }

    fn take_failure(&self, op: StoreOp, collection: Collection) -> Result<(), StoreError> {
        let mut failures = match self.failures.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pos) = failures
            .iter()
            .position(|rule| rule.op == op && rule.collection == collection)
        {
            if failures[pos].skip > 0 {
                failures[pos].skip -= 1;
                return Ok(());
            }
            failures.remove(pos);
            debug!("Injected {:?} failure on {}", op, collection);
            return Err(StoreError::Unavailable(format!(
                "injected {:?} failure on {}",
                op, collection
            )));
        }
        Ok(())
    }

    /// Inserts or replaces a document under a caller-chosen id.
    pub async fn seed(&self, collection: Collection, id: &str, fields: Fields) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub async fn snapshot(&self, collection: Collection, id: &str) -> Option<Fields> {
        let collections = self.collections.read().await;
        collections.get(&collection).and_then(|docs| docs.get(id).cloned())
    }

    pub async fn count(&self, collection: Collection) -> usize {
        let collections = self.collections.read().await;
        collections.get(&collection).map_or(0, |docs| docs.len())
    }
}

#[async_trait]
impl StoreGateway for InMemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.take_failure(StoreOp::Get, collection)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.take_failure(StoreOp::Query, collection)?;
        let collections = self.collections.read().await;
        let mut matched: Vec<Document> = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| query.matches(fields))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        matched.sort_by(|a, b| query.compare(&a.fields, &b.fields));
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn create(&self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        self.take_failure(StoreOp::Create, collection)?;
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, delta: Fields) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Update, collection)?;
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection.as_str(), id))?;
        doc.extend(delta);
        Ok(())
    }

    async fn update_if(
        &self,
        collection: Collection,
        id: &str,
        condition: &Predicate,
        delta: Fields,
    ) -> Result<bool, StoreError> {
        self.take_failure(StoreOp::Update, collection)?;
        // Check and write under one write guard.
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection.as_str(), id))?;
        if !condition.matches(doc) {
            return Ok(false);
        }
        doc.extend(delta);
        Ok(true)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.take_failure(StoreOp::Delete, collection)?;
        let mut collections = self.collections.write().await;
        collections
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection.as_str(), id))
    }
}
