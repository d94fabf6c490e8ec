//! Error types for the dashboard.

use thiserror::Error;

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while starting or serving the dashboard.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be loaded
    #[error("Data load error: {0}")]
    DataLoad(#[from] joymap_data::Error),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// Geometry file could not be indexed
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
