mod backend;
pub mod collections;
mod json_file;
mod postgres_backend;
mod sqlite_backend;

pub use backend::{PersistenceBackend, Record, StorageError};
pub use json_file::JsonFileBackend;
pub use postgres_backend::PostgresBackend;
pub use sqlite_backend::SqliteBackend;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{Cli, PersistenceBackendKind};

const BACKEND_SENTINEL_FILE: &str = "backend.sentinel";

/// Thin typed wrapper over a [`PersistenceBackend`], selected at startup
/// from `--persistence-backend` (§4.1).
pub struct PersistenceStore {
    backend: Box<dyn PersistenceBackend>,
}

impl PersistenceStore {
    pub async fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&cli.data_dir)?;
        let backend: Box<dyn PersistenceBackend> = match cli.persistence_backend {
            PersistenceBackendKind::File => {
                Box::new(JsonFileBackend::new(cli.data_dir.join("db")))
            }
            PersistenceBackendKind::Sqlite => {
                let url = cli.database_url.clone().unwrap_or_else(|| {
                    format!("sqlite://{}", cli.data_dir.join("thornkeep.db").display())
                });
                Box::new(SqliteBackend::connect(&url).await?)
            }
            PersistenceBackendKind::Postgres => {
                let url = cli
                    .database_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("--database-url is required for the postgres backend"))?;
                Box::new(PostgresBackend::connect(&url).await?)
            }
        };

        Self::check_sentinel(&cli.data_dir, backend.backend_name())?;
        Ok(Self { backend })
    }

    /// Warns (never fails a boot) when the selected backend differs from
    /// the one last used against this data directory, since switching
    /// backends silently orphans whatever the previous one held.
    fn check_sentinel(data_dir: &Path, backend_name: &str) -> anyhow::Result<()> {
        let path = data_dir.join(BACKEND_SENTINEL_FILE);
        if let Ok(previous) = std::fs::read_to_string(&path) {
            let previous = previous.trim();
            if !previous.is_empty() && previous != backend_name {
                log::warn!(
                    "persistence backend changed from '{previous}' to '{backend_name}'; \
                     existing data under this backend will not be visible until migrated"
                );
            }
        }
        std::fs::write(path, backend_name)?;
        Ok(())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub async fn load_all_typed<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, T)>, StorageError> {
        let raw = self.backend.load_all(collection).await?;
        raw.into_iter()
            .map(|(key, value)| Ok((key, serde_json::from_value(value)?)))
            .collect()
    }

    pub async fn save_all_typed<T: Serialize>(
        &self,
        collection: &str,
        records: Vec<(String, T)>,
    ) -> Result<(), StorageError> {
        let raw = records
            .into_iter()
            .map(|(key, value)| Ok((key, serde_json::to_value(value)?)))
            .collect::<Result<Vec<_>, StorageError>>()?;
        self.backend.save_all(collection, raw).await
    }

    pub async fn load_one_typed<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        match self.backend.load_one(collection, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save_one_typed<T: Serialize>(
        &self,
        collection: &str,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        self.backend
            .save_one(collection, key, serde_json::to_value(value)?)
            .await
    }

    pub async fn delete_one(&self, collection: &str, key: &str) -> Result<(), StorageError> {
        self.backend.delete_one(collection, key).await
    }
}

/// Copies every record in `collections` from one backend to another,
/// for operators changing `--persistence-backend` on an existing data
/// directory. Not invoked automatically; exposed for an admin-triggered
/// migration command.
pub async fn migrate_collections(
    from: &dyn PersistenceBackend,
    to: &dyn PersistenceBackend,
    collections: &[&str],
) -> Result<(), StorageError> {
    for &collection in collections {
        let records = from.load_all(collection).await?;
        to.save_all(collection, records).await?;
    }
    Ok(())
}

pub const ALL_COLLECTIONS: &[&str] = &[
    collections::USERS,
    collections::ROOMS,
    collections::ROOM_STATE,
    collections::ITEM_TEMPLATES,
    collections::ITEM_INSTANCES,
    collections::NPC_TEMPLATES,
    collections::AREAS,
    collections::ABILITIES,
    collections::QUESTS,
    collections::ADMIN,
    collections::BUG_REPORTS,
    collections::MUD_CONFIG,
    collections::GAMETIMER_CONFIG,
    collections::SNAKE_SCORES,
];
