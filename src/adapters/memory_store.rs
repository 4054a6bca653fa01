use crate::domain::filter::Filter;
use crate::domain::model::{Document, ID_FIELD};
use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) type Collections = HashMap<String, Vec<Document>>;

/// Process-local document store. Contents are lost on shutdown.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// 以下操作同時供 JsonFileStore 使用，確保兩種後端語意一致

pub(crate) fn insert(collections: &mut Collections, collection: &str, mut document: Document) -> String {
    let id = new_id();
    document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
    collections
        .entry(collection.to_string())
        .or_default()
        .push(document);
    id
}

pub(crate) fn insert_unique(
    collections: &mut Collections,
    collection: &str,
    unique: &Filter,
    document: Document,
) -> Option<String> {
    let taken = collections
        .get(collection)
        .is_some_and(|docs| docs.iter().any(|d| unique.matches(d)));
    if taken {
        return None;
    }
    Some(insert(collections, collection, document))
}

pub(crate) fn find(collections: &Collections, collection: &str, filter: &Filter) -> Vec<Document> {
    collections
        .get(collection)
        .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
        .unwrap_or_default()
}

pub(crate) fn upsert(
    collections: &mut Collections,
    collection: &str,
    filter: &Filter,
    mut document: Document,
) -> String {
    let docs = collections.entry(collection.to_string()).or_default();
    if let Some(existing) = docs.iter_mut().find(|d| filter.matches(d)) {
        let id = existing
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(new_id);
        document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        *existing = document;
        return id;
    }
    insert(collections, collection, document)
}

pub(crate) fn delete(
    collections: &mut Collections,
    collection: &str,
    filter: &Filter,
    limit: Option<usize>,
) -> usize {
    let Some(docs) = collections.get_mut(collection) else {
        return 0;
    };
    let limit = limit.unwrap_or(usize::MAX);
    let mut removed = 0;
    docs.retain(|d| {
        if removed < limit && filter.matches(d) {
            removed += 1;
            false
        } else {
            true
        }
    });
    removed
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String> {
        let mut collections = self.collections.write().await;
        Ok(insert(&mut collections, collection, document))
    }

    async fn insert_unique(
        &self,
        collection: &str,
        unique: &Filter,
        document: Document,
    ) -> Result<Option<String>> {
        let mut collections = self.collections.write().await;
        Ok(insert_unique(&mut collections, collection, unique, document))
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(find(&collections, collection, filter))
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<String> {
        let mut collections = self.collections.write().await;
        Ok(upsert(&mut collections, collection, filter, document))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool> {
        let mut collections = self.collections.write().await;
        Ok(delete(&mut collections, collection, filter, Some(1)) == 1)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize> {
        let mut collections = self.collections.write().await;
        Ok(delete(&mut collections, collection, filter, None))
    }
}
