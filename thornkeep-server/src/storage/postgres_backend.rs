use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use super::backend::{PersistenceBackend, Record, StorageError};

/// The remote-SQL backend (§4.1): same `records` table shape as
/// [`super::sqlite_backend::SqliteBackend`], reachable over the network.
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                data JSONB NOT NULL,
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
impl PersistenceBackend for PostgresBackend {
    async fn load_all(&self, collection: &str) -> Result<Vec<Record>, StorageError> {
        let rows = sqlx::query("SELECT key, data FROM records WHERE collection = $1")
            .bind(collection)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let key: String = row.try_get("key").map_err(|e| StorageError::Database(e.to_string()))?;
                let data: serde_json::Value =
                    row.try_get("data").map_err(|e| StorageError::Database(e.to_string()))?;
                Ok((key, data))
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
            sqlx::query(
                "INSERT INTO records (collection, key, data) VALUES ($1, $2, $3)
                 ON CONFLICT (collection, key) DO UPDATE SET data = excluded.data",
            )
            .bind(collection)
            .bind(&key)
            .bind(&value)
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
        let row = sqlx::query("SELECT data FROM records WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        match row {
            Some(row) => Ok(Some(
                row.try_get("data").map_err(|e| StorageError::Database(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    async fn save_one(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO records (collection, key, data) VALUES ($1, $2, $3)
             ON CONFLICT (collection, key) DO UPDATE SET data = excluded.data",
        )
        .bind(collection)
        .bind(key)
        .bind(&record)
        .execute(&self.pool)
        .await
        .map_err(|error| StorageError::Database(error.to_string()))?;
        Ok(())
    }

    async fn delete_one(&self, collection: &str, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM records WHERE collection = $1 AND key = $2")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|error| StorageError::Database(error.to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
