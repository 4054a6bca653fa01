use crate::adapters::memory_store::{self, Collections};
use crate::domain::filter::Filter;
use crate::domain::model::Document;
use crate::domain::ports::DocumentStore;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed store: each collection is a JSON array in
/// `<data_dir>/<collection>.json`, loaded at open and rewritten on change.
#[derive(Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    collections: Mutex<Collections>,
}

impl JsonFileStore {
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;

        let mut collections = Collections::new();
        let mut entries = tokio::fs::read_dir(&data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = tokio::fs::read(&path).await?;
            let documents: Vec<Document> = serde_json::from_slice(&content).map_err(|e| {
                AppError::storage(format!("corrupt collection file {}: {}", path.display(), e))
            })?;
            tracing::debug!("Loaded {} documents from {}", documents.len(), path.display());
            collections.insert(name.to_string(), documents);
        }

        tracing::info!(
            "💾 Opened JSON store at {} ({} collections)",
            data_dir.display(),
            collections.len()
        );

        Ok(Self {
            data_dir,
            collections: Mutex::new(collections),
        })
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        if collection.is_empty()
            || !collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::storage(format!(
                "invalid collection name '{}'",
                collection
            )));
        }
        Ok(self.data_dir.join(format!("{}.json", collection)))
    }

    // 先寫入暫存檔再 rename，避免寫到一半的檔案
    async fn persist(&self, collections: &Collections, collection: &str) -> Result<()> {
        let path = self.collection_path(collection)?;
        let empty = Vec::new();
        let documents = collections.get(collection).unwrap_or(&empty);
        let data = serde_json::to_vec_pretty(documents)?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &data).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }

    /// Applies `change` to a staged copy of one collection and swaps it in
    /// only after the file was written. `change` reports whether it modified
    /// anything; untouched collections are not rewritten.
    async fn write<R, F>(&self, collection: &str, change: F) -> Result<R>
    where
        F: FnOnce(&mut Collections) -> (R, bool) + Send,
        R: Send,
    {
        self.collection_path(collection)?;
        let mut collections = self.collections.lock().await;

        let mut staged = Collections::new();
        if let Some(documents) = collections.get(collection) {
            staged.insert(collection.to_string(), documents.clone());
        }

        let (result, changed) = change(&mut staged);
        if changed {
            self.persist(&staged, collection).await?;
            let documents = staged.remove(collection).unwrap_or_default();
            collections.insert(collection.to_string(), documents);
        }
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String> {
        self.write(collection, |staged| {
            (memory_store::insert(staged, collection, document), true)
        })
        .await
    }

    async fn insert_unique(
        &self,
        collection: &str,
        unique: &Filter,
        document: Document,
    ) -> Result<Option<String>> {
        self.write(collection, |staged| {
            let id = memory_store::insert_unique(staged, collection, unique, document);
            let changed = id.is_some();
            (id, changed)
        })
        .await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>> {
        let collections = self.collections.lock().await;
        Ok(memory_store::find(&collections, collection, filter)
            .into_iter()
            .next())
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.collections.lock().await;
        Ok(memory_store::find(&collections, collection, filter))
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: &Filter,
        document: Document,
    ) -> Result<String> {
        self.write(collection, |staged| {
            (memory_store::upsert(staged, collection, filter, document), true)
        })
        .await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool> {
        self.write(collection, |staged| {
            let removed = memory_store::delete(staged, collection, filter, Some(1));
            (removed == 1, removed > 0)
        })
        .await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize> {
        self.write(collection, |staged| {
            let removed = memory_store::delete(staged, collection, filter, None);
            (removed, removed > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let id = {
            let store = JsonFileStore::open(temp_dir.path()).await.unwrap();
            store
                .insert_one("listings", doc(json!({"title": "Loft", "price": 410000})))
                .await
                .unwrap()
        };

        assert!(temp_dir.path().join("listings.json").exists());
        assert!(!temp_dir.path().join("listings.json.tmp").exists());

        let reopened = JsonFileStore::open(temp_dir.path()).await.unwrap();
        let found = reopened
            .find_one("listings", &Filter::by_id(&id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["title"], json!("Loft"));

        assert!(reopened.delete_one("listings", &Filter::by_id(&id)).await.unwrap());
        let again = JsonFileStore::open(temp_dir.path()).await.unwrap();
        assert!(again.find_many("listings", &Filter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("users.json"), b"{not an array").unwrap();

        let err = JsonFileStore::open(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageError { .. }));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_documents_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        let store = JsonFileStore::open(&data_dir).await.unwrap();
        let id = store
            .insert_one("favorites", doc(json!({"userId": "u1", "title": "Loft"})))
            .await
            .unwrap();

        // 資料夾消失後寫檔必定失敗
        std::fs::remove_dir_all(&data_dir).unwrap();

        let result = store
            .insert_one("favorites", doc(json!({"userId": "u1", "title": "Cabin"})))
            .await;
        assert!(matches!(result, Err(AppError::IoError(_))));

        assert!(store.delete_one("favorites", &Filter::by_id(&id)).await.is_err());
        assert!(store
            .upsert_one(
                "favorites",
                &Filter::by_id(&id),
                doc(json!({"userId": "u1", "title": "Renamed"}))
            )
            .await
            .is_err());

        let remaining = store.find_many("favorites", &Filter::new()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["title"], json!("Loft"));
    }

    #[tokio::test]
    async fn test_insert_unique_rejects_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path()).await.unwrap();
        let unique = Filter::new().eq("email", "ana@example.com");

        let first = store
            .insert_unique("users", &unique, doc(json!({"email": "ana@example.com"})))
            .await
            .unwrap();
        let second = store
            .insert_unique("users", &unique, doc(json!({"email": "ana@example.com"})))
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let reopened = JsonFileStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(reopened.find_many("users", &Filter::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_path_like_collection_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path()).await.unwrap();
        assert!(store.insert_one("../escape", Document::new()).await.is_err());
    }
}
