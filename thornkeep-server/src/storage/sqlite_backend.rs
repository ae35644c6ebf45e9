use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use super::backend::{PersistenceBackend, Record, StorageError};

/// The embedded-SQL backend (§4.1), one `records` table keyed by
/// `(collection, key)`.
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (collection, key)
            )",
        )
        .execute(&pool)
        .await
        .map_err(|error| StorageError::Database(error.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl PersistenceBackend for SqliteBackend {
    async fn load_all(&self, collection: &str) -> Result<Vec<Record>, StorageError> {
        let rows = sqlx::query("SELECT key, data FROM records WHERE collection = ?1")
            .bind(collection)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let key: String = row.try_get("key").map_err(|e| StorageError::Database(e.to_string()))?;
                let data: String = row.try_get("data").map_err(|e| StorageError::Database(e.to_string()))?;
                let value = serde_json::from_str(&data)?;
                Ok((key, value))
            })
            .collect()
    }

    async fn save_all(&self, collection: &str, records: Vec<Record>) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        for (key, value) in records {
            let data = serde_json::to_string(&value)?;
            sqlx::query(
                "INSERT INTO records (collection, key, data) VALUES (?1, ?2, ?3)
                 ON CONFLICT(collection, key) DO UPDATE SET data = excluded.data",
            )
            .bind(collection)
            .bind(&key)
            .bind(&data)
            .execute(&mut tx)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        Ok(())
    }

    async fn load_one(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StorageError> {
        let row = sqlx::query("SELECT data FROM records WHERE collection = ?1 AND key = ?2")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        match row {
            Some(row) => {
                let data: String = row.try_get("data").map_err(|e| StorageError::Database(e.to_string()))?;
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn save_one(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StorageError> {
        let data = serde_json::to_string(&record)?;
        sqlx::query(
            "INSERT INTO records (collection, key, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, key) DO UPDATE SET data = excluded.data",
        )
        .bind(collection)
        .bind(key)
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|error| StorageError::Database(error.to_string()))?;
        Ok(())
    }

    async fn delete_one(&self, collection: &str, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM records WHERE collection = ?1 AND key = ?2")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
