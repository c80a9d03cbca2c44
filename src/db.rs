use std::{path::Path, str::FromStr};

use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use thiserror::Error;
use tracing::{debug, info};

use crate::record::MergedRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local store unavailable")]
    Unavailable(#[source] sqlx::Error),

    #[error("failed to write record to local store")]
    Write(#[source] sqlx::Error),

    #[error("failed to read rows from local store")]
    Read(#[source] sqlx::Error),
}

/// Persisted form of a [`MergedRecord`].
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StoredRow {
    pub device_time: String,

    pub temperature: f64,

    pub humidity: f64,
}

/// Append-only SQLite log of merged records.
///
/// The pool holds a single connection; the coordinator is the only writer.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let store = Self::connect(options).await?;
        info!(path = %path.display(), "local store initialized");

        Ok(store)
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        let options =
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(StoreError::Unavailable)?;

        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StoreError::Unavailable)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS data (device_time TEXT, temperature REAL, humidity REAL)",
        )
        .execute(&pool)
        .await
        .map_err(StoreError::Unavailable)?;

        Ok(Self { pool })
    }

    pub async fn append(&self, record: &MergedRecord) -> Result<(), StoreError> {
        debug!(?record, "saving record to local store");

        sqlx::query("INSERT INTO data (device_time, temperature, humidity) VALUES (?, ?, ?)")
            .bind(record.device_time.as_str())
            .bind(record.temperature)
            .bind(record.humidity)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Write)?;

        Ok(())
    }

    /// All stored rows in insertion order.
    pub async fn rows(&self) -> Result<Vec<StoredRow>, StoreError> {
        sqlx::query_as::<_, StoredRow>(
            "SELECT device_time, temperature, humidity FROM data ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Read)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
