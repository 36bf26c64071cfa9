//! BDD step definitions for schema cache tasks

use beacon::cache::Cache;
use beacon::catalog::{CatalogTable, ColumnInfo};
use cucumber::{given, then, when};

use crate::world::BeaconWorld;

fn split(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn result(world: &BeaconWorld) -> &serde_json::Value {
    world.task_result.as_ref().expect("no task ran")
}

#[given(expr = "data source {int} has database {string} with table {string} and columns {string}")]
fn database_with_table(
    world: &mut BeaconWorld,
    id: i64,
    database: String,
    table: String,
    columns: String,
) {
    let columns = split(&columns)
        .into_iter()
        .map(|name| ColumnInfo {
            name,
            data_type: "string".to_string(),
        })
        .collect();
    world
        .catalogs
        .entry(id)
        .or_default()
        .entry(database)
        .or_default()
        .push(CatalogTable {
            name: table,
            columns,
        });
}

#[given(expr = "data source {int} has an empty database {string}")]
fn empty_database(world: &mut BeaconWorld, id: i64, database: String) {
    world
        .catalogs
        .entry(id)
        .or_default()
        .entry(database)
        .or_default();
}

#[given(expr = "the cache key {string} already holds {string}")]
async fn cache_holds(world: &mut BeaconWorld, key: String, value: String) {
    world.cache.set(&key, &value).await.unwrap();
}

#[when(expr = "the databases of data source {int} are listed with cache key {string}")]
async fn list_databases(world: &mut BeaconWorld, id: i64, key: String) {
    let result = world.beacon().tasks().get_databases(id, &key).await;
    world.task_result = Some(serde_json::to_value(result).unwrap());
}

#[when(expr = "the tables of {string} in data source {int} are listed with cache key {string}")]
async fn list_tables_with_columns(world: &mut BeaconWorld, database: String, id: i64, key: String) {
    let result = world
        .beacon()
        .tasks()
        .get_database_tables_with_columns(id, &database, &key)
        .await;
    world.task_result = Some(serde_json::to_value(result).unwrap());
}

#[when(expr = "the tables of {string} in data source {int} are listed without columns")]
async fn list_tables(world: &mut BeaconWorld, database: String, id: i64) {
    let result = world.beacon().tasks().get_tables(id, &database).await;
    world.task_result = Some(serde_json::to_value(result).unwrap());
}

#[when(expr = "the columns of table {string} in {string} of data source {int} are listed")]
async fn list_columns(world: &mut BeaconWorld, table: String, database: String, id: i64) {
    let result = world
        .beacon()
        .tasks()
        .get_table_columns(id, &database, &table)
        .await;
    world.task_result = Some(serde_json::to_value(result).unwrap());
}

#[then(expr = "the result is the list {string}")]
fn result_is_list(world: &mut BeaconWorld, list: String) {
    assert_eq!(result(world), &serde_json::json!(split(&list)));
}

#[then(expr = "the result is an error with code {int} and message {string}")]
fn result_is_error(world: &mut BeaconWorld, code: i64, message: String) {
    assert_eq!(
        result(world),
        &serde_json::json!({ "error": { "code": code, "message": message } })
    );
}

#[then(expr = "the result lists {int} table(s) with has_columns {word}")]
fn result_lists_tables(world: &mut BeaconWorld, count: usize, has_columns: String) {
    let value = result(world);
    assert_eq!(value["schema"].as_array().map(Vec::len), Some(count), "{value}");
    assert_eq!(value["has_columns"], serde_json::json!(has_columns == "true"));
}

#[then(expr = "the result names columns {string}")]
fn result_names_columns(world: &mut BeaconWorld, list: String) {
    let names: Vec<String> = result(world)
        .as_array()
        .expect("result is not a list")
        .iter()
        .map(|column| column["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, split(&list));
}

#[then(expr = "the cache key {string} is absent")]
async fn cache_absent(world: &mut BeaconWorld, key: String) {
    assert!(!world.cache.exists(&key).await.unwrap());
}

#[then(expr = "the cache key {string} holds {string}")]
async fn cache_holds_value(world: &mut BeaconWorld, key: String, expected: String) {
    let cached = world.cache.get(&key).await.unwrap();
    assert_eq!(cached.as_deref(), Some(expected.as_str()));
}

#[then(expr = "the cache key {string} holds the list {string}")]
async fn cache_holds_list(world: &mut BeaconWorld, key: String, list: String) {
    let cached = world.cache.get(&key).await.unwrap().expect("nothing cached");
    let cached: Vec<String> = serde_json::from_str(&cached).unwrap();
    assert_eq!(cached, split(&list));
}

#[then(expr = "the cache key {string} holds table {string}")]
async fn cache_holds_table(world: &mut BeaconWorld, key: String, table: String) {
    let cached = world.cache.get(&key).await.unwrap().expect("nothing cached");
    let cached: serde_json::Value = serde_json::from_str(&cached).unwrap();
    let names: Vec<&str> = cached
        .as_array()
        .expect("cached schema is not a list")
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(names.contains(&table.as_str()), "{cached}");
}
