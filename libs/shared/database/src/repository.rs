use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use shared_models::{DocumentMapped, StoreError};

use crate::gateway::{Query, StoreGateway};

/// Typed CRUD over the collection an entity maps to.
pub struct Repository<T> {
    store: Arc<dyn StoreGateway>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: DocumentMapped> Repository<T> {
    pub fn new(store: Arc<dyn StoreGateway>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(|doc| T::from_document(&doc))
            .transpose()
    }

    pub async fn list(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        let docs = self.store.query(T::COLLECTION, query).await?;
        docs.iter().map(T::from_document).collect()
    }

    /// Stores a new entity. Any `id` already set on it is ignored.
    pub async fn create(&self, entity: &T) -> Result<String, StoreError> {
        let id = self.store.create(T::COLLECTION, entity.to_fields()?).await?;
        debug!("Created {} document {}", T::COLLECTION, id);
        Ok(id)
    }

    pub async fn update(&self, entity: &T) -> Result<(), StoreError> {
        self.store
            .update(T::COLLECTION, entity.id(), entity.to_fields()?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }
}
