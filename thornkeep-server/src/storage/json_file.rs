use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::backend::{PersistenceBackend, Record, StorageError};

/// One directory per collection, one `<key>.json` file per record, written
/// via tempfile-then-rename so a save of a well-formed record is never
/// half-visible — directly grounded on the teacher's
/// `AccountStorage`/`CharacterStorage::save_impl`.
pub struct JsonFileBackend {
    root: PathBuf,
    collection_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            collection_locks: Mutex::new(HashMap::new()),
        }
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    fn record_path(&self, collection: &str, key: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{key}.json"))
    }

    async fn lock_for(&self, collection: &str) -> Arc<Mutex<()>> {
        let mut locks = self.collection_locks.lock().await;
        locks
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn write_atomic(dir: &Path, path: &Path, value: &serde_json::Value) -> Result<(), StorageError> {
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(value)?;
        let mut file = tempfile::Builder::new().tempfile_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(path)
            .map_err(|error| StorageError::Io(error.error))?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceBackend for JsonFileBackend {
    async fn load_all(&self, collection: &str) -> Result<Vec<Record>, StorageError> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let key = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string();
            let contents = std::fs::read_to_string(&path)?;
            let value: serde_json::Value = serde_json::from_str(&contents)?;
            records.push((key, value));
        }
        Ok(records)
    }

    async fn save_all(&self, collection: &str, records: Vec<Record>) -> Result<(), StorageError> {
        let lock = self.lock_for(collection).await;
        let _guard = lock.lock().await;
        let dir = self.collection_dir(collection);
        for (key, value) in records {
            let path = self.record_path(collection, &key);
            Self::write_atomic(&dir, &path, &value)?;
        }
        Ok(())
    }

    async fn load_one(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        let path = self.record_path(collection, key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn save_one(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StorageError> {
        let lock = self.lock_for(collection).await;
        let _guard = lock.lock().await;
        let dir = self.collection_dir(collection);
        let path = self.record_path(collection, key);
        Self::write_atomic(&dir, &path, &record)
    }

    async fn delete_one(&self, collection: &str, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(collection, key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
