//! Data sources and the query runners that read their metadata

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::DataSourceConfig;

/// A table and, when known, the names of its columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// A table as written in a catalog data source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
}

/// Metadata capabilities of a data source's query runner
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait QueryRunner: Send + Sync {
    async fn get_databases(&self) -> crate::Result<Vec<String>>;

    async fn get_database_tables_with_columns(
        &self,
        database: &str,
    ) -> crate::Result<Vec<TableSchema>>;

    async fn get_table_columns(&self, database: &str, table: &str)
        -> crate::Result<Vec<ColumnInfo>>;
}

#[derive(Clone)]
pub struct DataSource {
    pub id: i64,
    pub name: String,
    pub runner: Arc<dyn QueryRunner>,
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Lookup of data sources by id
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait DataSourceStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> crate::Result<DataSource>;
}

/// Query runner answering from a static catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogQueryRunner {
    databases: BTreeMap<String, Vec<CatalogTable>>,
}

impl CatalogQueryRunner {
    pub fn new(databases: BTreeMap<String, Vec<CatalogTable>>) -> Self {
        Self { databases }
    }

    fn tables(&self, database: &str) -> crate::Result<&[CatalogTable]> {
        self.databases
            .get(database)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                crate::BeaconError::QueryRunner(format!("Unknown database '{}'", database))
            })
    }
}

#[async_trait]
impl QueryRunner for CatalogQueryRunner {
    async fn get_databases(&self) -> crate::Result<Vec<String>> {
        Ok(self.databases.keys().cloned().collect())
    }

    async fn get_database_tables_with_columns(
        &self,
        database: &str,
    ) -> crate::Result<Vec<TableSchema>> {
        Ok(self
            .tables(database)?
            .iter()
            .map(|table| TableSchema {
                name: table.name.clone(),
                columns: table.columns.iter().map(|c| c.name.clone()).collect(),
            })
            .collect())
    }

    async fn get_table_columns(
        &self,
        database: &str,
        table: &str,
    ) -> crate::Result<Vec<ColumnInfo>> {
        self.tables(database)?
            .iter()
            .find(|t| t.name == table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| {
                crate::BeaconError::QueryRunner(format!(
                    "Unknown table '{}' in database '{}'",
                    table, database
                ))
            })
    }
}

/// In-memory data source store built from configuration
#[derive(Debug, Default)]
pub struct DataSourceRegistry {
    sources: HashMap<i64, DataSource>,
}

impl DataSourceRegistry {
    pub fn from_config(configs: &[DataSourceConfig]) -> Self {
        let sources = configs
            .iter()
            .map(|config| {
                let runner: Arc<dyn QueryRunner> = match config {
                    DataSourceConfig::Catalog { databases, .. } => {
                        Arc::new(CatalogQueryRunner::new(databases.clone()))
                    }
                };
                tracing::debug!("Loaded data source {} '{}'", config.id(), config.name());
                (
                    config.id(),
                    DataSource {
                        id: config.id(),
                        name: config.name().to_string(),
                        runner,
                    },
                )
            })
            .collect();
        Self { sources }
    }

    pub fn insert(&mut self, source: DataSource) {
        self.sources.insert(source.id, source);
    }
}

#[async_trait]
impl DataSourceStore for DataSourceRegistry {
    async fn get_by_id(&self, id: i64) -> crate::Result<DataSource> {
        self.sources
            .get(&id)
            .cloned()
            .ok_or_else(|| crate::BeaconError::DataSource(format!("Data source {} not found", id)))
    }
}
