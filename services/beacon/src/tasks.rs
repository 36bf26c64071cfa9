//! Schema metadata tasks backed by the query runner cache
//!
//! Every task completes: upstream failures are reported in-band as a
//! [`TaskResult::Error`] envelope and never touch the cache.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::catalog::{ColumnInfo, DataSourceStore, TableSchema};

/// Lifetime of a cached schema entry
pub const SCHEMA_CACHE_EXPIRATION_SECS: u64 = 3600;

/// Code carried by every task error envelope
pub const TASK_ERROR_CODE: i32 = 2;

pub const DATABASES_ERROR: &str = "Error retrieving database list.";
pub const SCHEMA_ERROR: &str = "Error retrieving schema.";
pub const TABLE_COLUMNS_ERROR: &str = "Error retrieving table columns.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    pub code: i32,
    pub message: String,
}

/// Either the task's value or `{"error": {"code": 2, "message": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskResult<T> {
    Error { error: TaskError },
    Ok(T),
}

impl<T> TaskResult<T> {
    pub fn error(message: &str) -> Self {
        TaskResult::Error {
            error: TaskError {
                code: TASK_ERROR_CODE,
                message: message.to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TaskResult::Error { .. })
    }

    pub fn ok(self) -> Option<T> {
        match self {
            TaskResult::Ok(value) => Some(value),
            TaskResult::Error { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaListing {
    pub schema: Vec<TableSchema>,
    pub has_columns: bool,
}

pub struct SchemaTasks {
    store: Arc<dyn DataSourceStore>,
    cache: Arc<dyn Cache>,
}

impl std::fmt::Debug for SchemaTasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaTasks").finish()
    }
}

impl SchemaTasks {
    pub fn new(store: Arc<dyn DataSourceStore>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache }
    }

    /// List databases and cache the full list under `cache_key`
    pub async fn get_databases(&self, data_source_id: i64, cache_key: &str) -> TaskResult<Vec<String>> {
        match self.fetch_databases(data_source_id).await {
            Ok(databases) => {
                self.store_in_cache(cache_key, &databases).await;
                TaskResult::Ok(databases)
            }
            Err(e) => {
                tracing::error!(error = %e, data_source_id, "{}", DATABASES_ERROR);
                TaskResult::error(DATABASES_ERROR)
            }
        }
    }

    /// List tables with their columns.
    ///
    /// An empty result is only cached when `cache_key` already holds an entry.
    pub async fn get_database_tables_with_columns(
        &self,
        data_source_id: i64,
        database: &str,
        cache_key: &str,
    ) -> TaskResult<SchemaListing> {
        let tables = match self.fetch_tables(data_source_id, database).await {
            Ok(tables) => tables,
            Err(e) => {
                tracing::error!(error = %e, data_source_id, database, "{}", SCHEMA_ERROR);
                return TaskResult::error(SCHEMA_ERROR);
            }
        };

        if !tables.is_empty() || self.key_exists(cache_key).await {
            self.store_in_cache(cache_key, &tables).await;
        } else {
            tracing::debug!("Not caching empty schema for {}", cache_key);
        }

        TaskResult::Ok(SchemaListing {
            schema: tables,
            has_columns: true,
        })
    }

    pub async fn get_tables(&self, data_source_id: i64, database: &str) -> TaskResult<SchemaListing> {
        match self.fetch_tables(data_source_id, database).await {
            Ok(tables) => TaskResult::Ok(SchemaListing {
                schema: tables,
                has_columns: false,
            }),
            Err(e) => {
                tracing::error!(error = %e, data_source_id, database, "{}", SCHEMA_ERROR);
                TaskResult::error(SCHEMA_ERROR)
            }
        }
    }

    pub async fn get_table_columns(
        &self,
        data_source_id: i64,
        database: &str,
        table: &str,
    ) -> TaskResult<Vec<ColumnInfo>> {
        match self.fetch_columns(data_source_id, database, table).await {
            Ok(columns) => TaskResult::Ok(columns),
            Err(e) => {
                tracing::error!(error = %e, data_source_id, database, table, "{}", TABLE_COLUMNS_ERROR);
                TaskResult::error(TABLE_COLUMNS_ERROR)
            }
        }
    }

    async fn fetch_databases(&self, data_source_id: i64) -> crate::Result<Vec<String>> {
        let source = self.store.get_by_id(data_source_id).await?;
        source.runner.get_databases().await
    }

    async fn fetch_tables(&self, data_source_id: i64, database: &str) -> crate::Result<Vec<TableSchema>> {
        let source = self.store.get_by_id(data_source_id).await?;
        source.runner.get_database_tables_with_columns(database).await
    }

    async fn fetch_columns(
        &self,
        data_source_id: i64,
        database: &str,
        table: &str,
    ) -> crate::Result<Vec<ColumnInfo>> {
        let source = self.store.get_by_id(data_source_id).await?;
        source.runner.get_table_columns(database, table).await
    }

    async fn key_exists(&self, cache_key: &str) -> bool {
        self.cache.exists(cache_key).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Cache lookup for {} failed", cache_key);
            false
        })
    }

    async fn store_in_cache<T: Serialize + Sync>(&self, cache_key: &str, value: &T) {
        if let Err(e) = self.try_store(cache_key, value).await {
            tracing::warn!(error = %e, "Failed to cache {}", cache_key);
        }
    }

    async fn try_store<T: Serialize + Sync>(&self, cache_key: &str, value: &T) -> crate::Result<()> {
        let serialized = serde_json::to_string(value)?;
        self.cache.set(cache_key, &serialized).await?;
        self.cache
            .expire(cache_key, SCHEMA_CACHE_EXPIRATION_SECS)
            .await?;
        tracing::debug!("Cached {} for {}s", cache_key, SCHEMA_CACHE_EXPIRATION_SECS);
        Ok(())
    }
}
