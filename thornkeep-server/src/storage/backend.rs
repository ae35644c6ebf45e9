use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("collection {0} not found")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(String),
}

/// One JSON-shaped record keyed within its collection (e.g. collection
/// `"users"`, key the lowercased username).
pub type Record = (String, serde_json::Value);

/// Typed load/save per collection, §4.1. Implementors store opaque JSON
/// values; typed convenience wrappers live on `PersistenceStore`.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    async fn load_all(&self, collection: &str) -> Result<Vec<Record>, StorageError>;
    async fn save_all(&self, collection: &str, records: Vec<Record>) -> Result<(), StorageError>;
    async fn load_one(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError>;
    async fn save_one(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StorageError>;
    async fn delete_one(&self, collection: &str, key: &str) -> Result<(), StorageError>;

    /// Human-readable name recorded in the backend-selection sentinel file.
    fn backend_name(&self) -> &'static str;
}
