//! Beacon CLI
//!
//! Command-line interface for alert destinations and schema tasks.

use std::path::PathBuf;

use beacon::alert::{Alert, AlertState, Query, User};
use beacon::destinations::AlertNotification;
use beacon::{load_config, BeaconBuilder, BeaconError, Config};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Alert notification destinations and schema tasks")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every destination type with its configuration schema
    Types,

    /// List configured destinations with secrets masked
    Destinations,

    /// Send an alert through a configured destination
    Notify {
        /// Name of the configured destination
        #[arg(short, long)]
        destination: String,

        /// JSON file holding `alert`, `query` and optionally `user` and `metadata`
        #[arg(short, long)]
        alert: PathBuf,

        /// New alert state (triggered, ok or unknown)
        #[arg(short, long, default_value = "triggered")]
        state: String,

        /// Base URL alert and query links are built from
        #[arg(long)]
        host: Option<String>,
    },

    /// List the databases of a data source
    ///
    /// The cache lives in this process only, so each run fetches afresh and
    /// the cached copy is dropped on exit.
    Databases {
        #[arg(long)]
        data_source: i64,

        #[arg(long, default_value = "databases")]
        cache_key: String,
    },

    /// List the tables of a database with their columns
    ///
    /// Like `databases`, the cache written here does not outlive the process.
    Tables {
        #[arg(long)]
        data_source: i64,

        #[arg(long)]
        database: String,

        #[arg(long)]
        cache_key: Option<String>,

        /// Skip column lookups and the cache
        #[arg(long)]
        no_columns: bool,
    },

    /// List the columns of a table
    Columns {
        #[arg(long)]
        data_source: i64,

        #[arg(long)]
        database: String,

        #[arg(long)]
        table: String,
    },
}

#[derive(Debug, Deserialize)]
struct AlertFile {
    alert: Alert,
    query: Query,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct DestinationListing<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    destination_type: &'static str,
    options: serde_json::Map<String, serde_json::Value>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BeaconError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, log_level={:?}, command={:?}",
        args.config,
        args.log_level,
        args.command
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.resolve_secrets()?;

    tracing::debug!(
        "Destinations: {}, Data sources: {}",
        config.destinations.len(),
        config.data_sources.len()
    );

    let beacon = BeaconBuilder::new(config).build()?;

    match args.command {
        Command::Types => print_json(&beacon.registry().descriptors())?,
        Command::Destinations => {
            let listing: Vec<DestinationListing<'_>> = beacon
                .destinations()
                .iter()
                .map(|d| DestinationListing {
                    name: &d.name,
                    destination_type: d.destination.type_name(),
                    options: d.masked_options(),
                })
                .collect();
            print_json(&listing)?;
        }
        Command::Notify {
            destination,
            alert,
            state,
            host,
        } => {
            let content = std::fs::read_to_string(&alert).map_err(|e| {
                BeaconError::Config(format!("Failed to read alert file {:?}: {}", alert, e))
            })?;
            let file: AlertFile = serde_json::from_str(&content)?;

            let mut notification =
                AlertNotification::new(&file.alert, &file.query, AlertState::parse(&state))
                    .with_app("beacon");
            if let Some(host) = host.as_deref() {
                notification = notification.with_host(host);
            }
            if let Some(user) = &file.user {
                notification = notification.with_user(user);
            }
            if let Some(metadata) = &file.metadata {
                notification = notification.with_metadata(metadata);
            }

            beacon.notify(&destination, &notification).await?;
            tracing::info!("Notification handed to '{}'", destination);
        }
        Command::Databases {
            data_source,
            cache_key,
        } => print_json(&beacon.tasks().get_databases(data_source, &cache_key).await)?,
        Command::Tables {
            data_source,
            database,
            cache_key,
            no_columns,
        } => {
            if no_columns {
                print_json(&beacon.tasks().get_tables(data_source, &database).await)?;
            } else {
                let cache_key = cache_key
                    .unwrap_or_else(|| format!("schema:{}:{}", data_source, database));
                let result = beacon
                    .tasks()
                    .get_database_tables_with_columns(data_source, &database, &cache_key)
                    .await;
                print_json(&result)?;
            }
        }
        Command::Columns {
            data_source,
            database,
            table,
        } => {
            let result = beacon
                .tasks()
                .get_table_columns(data_source, &database, &table)
                .await;
            print_json(&result)?;
        }
    }

    Ok(())
}
