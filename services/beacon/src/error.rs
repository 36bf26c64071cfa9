//! Error types for the beacon service

/// Errors that can occur in the beacon service
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid destination options: {0}")]
    Validation(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Query runner error: {0}")]
    QueryRunner(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

/// Result type alias for beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;
