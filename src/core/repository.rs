use crate::domain::filter::Filter;
use crate::domain::model::{Document, ID_FIELD};
use crate::domain::ports::DocumentStore;
use crate::utils::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Typed access to one collection of a [`DocumentStore`].
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    entity: &'static str,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str, entity: &'static str) -> Self {
        Self {
            store,
            collection,
            entity,
            _marker: std::marker::PhantomData,
        }
    }

    /// Inserts the record; any id it carries is replaced by the store's.
    pub async fn insert(&self, record: &T) -> Result<String> {
        let mut document = to_document(record)?;
        document.remove(ID_FIELD);
        self.store.insert_one(self.collection, document).await
    }

    /// Inserts unless a record matching `unique` exists; `None` on a clash.
    pub async fn insert_unique(&self, unique: &Filter, record: &T) -> Result<Option<String>> {
        let mut document = to_document(record)?;
        document.remove(ID_FIELD);
        self.store
            .insert_unique(self.collection, unique, document)
            .await
    }

    pub async fn upsert(&self, filter: &Filter, record: &T) -> Result<String> {
        let mut document = to_document(record)?;
        document.remove(ID_FIELD);
        self.store.upsert_one(self.collection, filter, document).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>> {
        self.store
            .find_one(self.collection, filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn get(&self, id: &str) -> Result<T> {
        self.find_one(&Filter::by_id(id))
            .await?
            .ok_or_else(|| AppError::not_found(self.entity, id))
    }

    pub async fn find_many(&self, filter: &Filter) -> Result<Vec<T>> {
        self.store
            .find_many(self.collection, filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    /// Deletes by id, failing with not-found when nothing was removed.
    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete_one(self.collection, &Filter::by_id(id)).await? {
            Ok(())
        } else {
            Err(AppError::not_found(self.entity, id))
        }
    }

    pub async fn delete_many(&self, filter: &Filter) -> Result<usize> {
        self.store.delete_many(self.collection, filter).await
    }
}

pub fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::storage(format!(
            "record did not serialize to an object: {}",
            other
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
