use crate::domain::filter::Filter;
use crate::domain::model::Document;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Document database collaborator. Collections are created on first write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores the document under a fresh id and returns it.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String>;

    /// Inserts only when no document matches `unique`, atomically with the
    /// check. Returns `None` when a match already exists.
    async fn insert_unique(
        &self,
        collection: &str,
        unique: &Filter,
        document: Document,
    ) -> Result<Option<String>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    async fn find_many(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>>;

    /// Replaces the first match (keeping its id) or inserts when nothing matches.
    async fn upsert_one(&self, collection: &str, filter: &Filter, document: Document)
        -> Result<String>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<usize>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Third-party language model used for chat replies and task generation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
